//! Frame sources.
//!
//! * [`RawVideoSource`] — packed `rgb24` frames from a file or stdin, e.g.
//!   `ffmpeg -f v4l2 -video_size 1280x720 -i /dev/video0 -f rawvideo -pix_fmt rgb24 - | air_sketch --raw-video -`
//! * [`SyntheticCamera`] — a static backdrop for simulation mode.

use std::fs::File;
use std::io::{self, BufReader, Read};

use tracing::debug;

use air_canvas::{Raster, CHANNELS};
use air_gesture::{CaptureError, FrameSource};

// ════════════════════════════════════════════════════════════════════════════
// RawVideoSource
// ════════════════════════════════════════════════════════════════════════════

pub struct RawVideoSource<R> {
    reader: R,
    width:  usize,
    height: usize,
    frames: u64,
}

impl<R: Read> RawVideoSource<R> {
    pub fn new(reader: R, width: usize, height: usize) -> Self {
        RawVideoSource { reader, width, height, frames: 0 }
    }
}

impl RawVideoSource<Box<dyn Read>> {
    /// `-` reads stdin; anything else is opened as a file.
    pub fn open(path: &str, width: usize, height: usize) -> io::Result<Self> {
        let reader: Box<dyn Read> = if path == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            Box::new(BufReader::new(File::open(path)?))
        };
        Ok(RawVideoSource::new(reader, width, height))
    }
}

impl<R: Read> FrameSource for RawVideoSource<R> {
    fn next_frame(&mut self) -> Result<Raster, CaptureError> {
        let mut buf = vec![0u8; self.width * self.height * CHANNELS];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!(frames = self.frames, "raw video exhausted");
                return Err(CaptureError::EndOfStream);
            }
            Err(e) => return Err(CaptureError::Io(e)),
        }
        self.frames += 1;
        Ok(Raster::from_rgb(self.width, self.height, buf)?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticCamera
// ════════════════════════════════════════════════════════════════════════════

/// Endless copies of a dim vertical gradient, so the composite still shows
/// something behind the ink.
pub struct SyntheticCamera {
    backdrop: Raster,
}

impl SyntheticCamera {
    pub fn new(width: usize, height: usize) -> Self {
        let mut backdrop = Raster::blank(width, height);
        for y in 0..height {
            let t = y as f32 / height.max(1) as f32;
            let shade = [
                (30.0 + 20.0 * t) as u8,
                (34.0 + 30.0 * t) as u8,
                (52.0 + 40.0 * t) as u8,
            ];
            for x in 0..width {
                backdrop.put(x, y, shade);
            }
        }
        SyntheticCamera { backdrop }
    }
}

impl FrameSource for SyntheticCamera {
    fn next_frame(&mut self) -> Result<Raster, CaptureError> {
        Ok(self.backdrop.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn raw_video_yields_whole_frames_then_ends() {
        // two 2×1 frames and a dangling partial one
        let mut bytes = vec![1u8; 6];
        bytes.extend(vec![2u8; 6]);
        bytes.extend(vec![3u8; 4]);
        let mut src = RawVideoSource::new(Cursor::new(bytes), 2, 1);

        assert_eq!(src.next_frame().unwrap().pixel(1, 0), Some([1, 1, 1]));
        assert_eq!(src.next_frame().unwrap().pixel(0, 0), Some([2, 2, 2]));
        assert!(matches!(src.next_frame(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn raw_video_empty_stream_ends_immediately() {
        let mut src = RawVideoSource::new(Cursor::new(Vec::<u8>::new()), 4, 4);
        assert!(matches!(src.next_frame(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(RawVideoSource::open("/definitely/not/here.rgb", 4, 4).is_err());
    }

    #[test]
    fn synthetic_camera_is_stable() {
        let mut cam = SyntheticCamera::new(16, 9);
        let a = cam.next_frame().unwrap();
        let b = cam.next_frame().unwrap();
        assert_eq!(a.dims(), (16, 9));
        assert_eq!(a, b);
        assert!(!a.is_blank());
    }
}
