//! Packed RGB raster shared by camera frames, the drawing canvas, and the
//! composited display frame.

use thiserror::Error;

/// Bytes per pixel (R, G, B).
pub const CHANNELS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("raster buffer holds {actual} bytes, {width}x{height} RGB needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("raster size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// A `width × height` image stored row-major as `[r, g, b, r, g, b, …]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// All-zero raster.
    pub fn blank(width: usize, height: usize) -> Self {
        Raster { width, height, data: vec![0; width * height * CHANNELS] }
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut r = Raster::blank(width, height);
        r.fill(rgb);
        r
    }

    /// Wrap an existing packed RGB buffer, checking its length.
    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, CanvasError> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(CanvasError::BufferSize { width, height, expected, actual: data.len() });
        }
        Ok(Raster { width, height, data })
    }

    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * CHANNELS);
        Raster { width, height, data }
    }

    pub fn width(&self)  -> usize          { self.width }
    pub fn height(&self) -> usize          { self.height }
    pub fn dims(&self)   -> (usize, usize) { (self.width, self.height) }
    pub fn as_bytes(&self) -> &[u8]        { &self.data }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Set one pixel; out-of-range writes are ignored.
    pub fn put(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * CHANNELS;
            self.data[i..i + CHANNELS].copy_from_slice(&rgb);
        }
    }

    pub fn fill(&mut self, rgb: [u8; 3]) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgb);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Number of pixels that are not pure black.
    pub fn inked_pixels(&self) -> usize {
        self.data.chunks_exact(CHANNELS).filter(|px| px.iter().any(|&b| b != 0)).count()
    }

    /// Copy into a `0x00RRGGBB` buffer (the layout minifb expects) at the
    /// given row stride.  Rows/columns beyond `out` are dropped.
    pub fn blit_xrgb(&self, out: &mut [u32], stride: usize) {
        if self.width == 0 {
            return;
        }
        for (y, row) in self.data.chunks_exact(self.width * CHANNELS).enumerate() {
            let base = y * stride;
            if base >= out.len() {
                break;
            }
            for (x, px) in row.chunks_exact(CHANNELS).enumerate().take(stride) {
                if let Some(slot) = out.get_mut(base + x) {
                    *slot = (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_checks_length() {
        assert!(Raster::from_rgb(2, 2, vec![0; 12]).is_ok());
        assert_eq!(
            Raster::from_rgb(2, 2, vec![0; 11]),
            Err(CanvasError::BufferSize { width: 2, height: 2, expected: 12, actual: 11 })
        );
    }

    #[test]
    fn put_ignores_out_of_range() {
        let mut r = Raster::blank(2, 2);
        r.put(5, 0, [1, 1, 1]);
        assert!(r.is_blank());
        assert_eq!(r.pixel(2, 0), None);
    }

    #[test]
    fn inked_pixels_counts_non_black() {
        let mut r = Raster::blank(3, 3);
        r.put(0, 0, [0, 0, 1]);
        r.put(2, 2, [9, 0, 0]);
        assert_eq!(r.inked_pixels(), 2);
    }

    #[test]
    fn blit_xrgb_packs_and_strides() {
        let mut r = Raster::blank(2, 2);
        r.put(1, 1, [0x12, 0x34, 0x56]);
        let mut out = vec![0xFFFF_FFFFu32; 3 * 2];
        r.blit_xrgb(&mut out, 3);
        assert_eq!(out[3 + 1], 0x0012_3456);
        assert_eq!(out[0], 0);
        // column past the raster width is left alone
        assert_eq!(out[2], 0xFFFF_FFFF);
    }

    #[test]
    fn blit_of_zero_width_raster_is_noop() {
        let mut out = vec![7u32; 4];
        Raster::blank(0, 2).blit_xrgb(&mut out, 2);
        assert_eq!(out, vec![7; 4]);
    }
}
