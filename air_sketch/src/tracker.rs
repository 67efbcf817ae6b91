//! Hand landmark sources — an external detector process and a keyboard/mouse
//! simulation.
//!
//! The session only sees [`HandLandmarker`]; it doesn't know whether the
//! hand came from a model or from the mouse.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::Deserialize;
use tracing::{debug, info, warn};

use air_canvas::{Raster, CHANNELS};
use air_gesture::{
    fingers_up, joints, DetectError, FingerState, HandLandmarker, HandObservation, Handedness,
    Landmark, LandmarkSet,
};

// ════════════════════════════════════════════════════════════════════════════
// Detector wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct PointJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Debug, Deserialize)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<PointJson>,
    /// Optional 0/1 flags, thumb..pinky.  Derived from joints when absent.
    #[serde(default)]
    fingers: Option<Vec<u8>>,
}

fn full_score() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one detector reply line.  Landmarks arrive normalised to
/// `[0, 1]` and are scaled to `width × height` pixels.  The first hand at or
/// above `min_score` with a full joint set wins.
pub fn parse_detection(
    line: &str,
    width: usize,
    height: usize,
    min_score: f32,
) -> Result<Option<HandObservation>, DetectError> {
    let reply: DetectionJson = serde_json::from_str(line.trim())
        .map_err(|e| DetectError::Protocol(format!("{}: {:?}", e, line.trim())))?;

    if let Some(err) = reply.error {
        return Err(DetectError::Detector(err));
    }

    for hand in reply.hands {
        if hand.score < min_score {
            debug!(score = hand.score, "hand below confidence threshold");
            continue;
        }
        if hand.landmarks.len() != joints::COUNT {
            warn!(count = hand.landmarks.len(), "expected {} landmarks", joints::COUNT);
            continue;
        }

        let landmarks = LandmarkSet(
            hand.landmarks
                .iter()
                .map(|p| Landmark { x: p.x * width as f32, y: p.y * height as f32, z: p.z })
                .collect(),
        );
        let handedness = Handedness::from_label(&hand.handedness);
        let fingers = match hand.fingers {
            Some(flags) => FingerState::from_flags(&flags).ok_or_else(|| {
                DetectError::Protocol(format!("expected 5 finger flags, got {}", flags.len()))
            })?,
            None => fingers_up(&landmarks, handedness)
                .ok_or_else(|| DetectError::Protocol("incomplete landmark set".into()))?,
        };

        return Ok(Some(HandObservation { fingers, landmarks, handedness }));
    }

    Ok(None)
}

// ════════════════════════════════════════════════════════════════════════════
// SubprocessLandmarker
// ════════════════════════════════════════════════════════════════════════════

/// Runs a detector command and talks to it over pipes.
///
/// Protocol: the child prints `READY` once.  For each frame we write
/// `width`, `height`, `channels` as little-endian `u32`, then the raw RGB
/// bytes; the child answers with one JSON line.
pub struct SubprocessLandmarker {
    child:     Child,
    stdin:     ChildStdin,
    stdout:    BufReader<ChildStdout>,
    min_score: f32,
}

impl SubprocessLandmarker {
    pub fn spawn(command: &str, min_score: f32) -> Result<Self, DetectError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| DetectError::Protocol("empty detector command".into()))?;

        info!(command, "starting hand detector");
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DetectError::Spawn { command: command.to_string(), source })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(i), Some(o)) => (i, BufReader::new(o)),
            _ => {
                let _ = child.kill();
                return Err(DetectError::Protocol("detector pipes unavailable".into()));
            }
        };

        let mut tracker = SubprocessLandmarker {
            child,
            stdin,
            stdout,
            min_score: min_score.clamp(0.0, 1.0),
        };
        let ready = tracker.read_line()?;
        if ready.trim() != "READY" {
            return Err(DetectError::Protocol(format!("detector did not signal READY, got {:?}", ready)));
        }
        info!("hand detector ready");
        Ok(tracker)
    }

    fn read_line(&mut self) -> Result<String, DetectError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(DetectError::Detector("detector exited".into()));
        }
        Ok(line)
    }
}

impl HandLandmarker for SubprocessLandmarker {
    fn detect(&mut self, frame: &Raster) -> Result<Option<HandObservation>, DetectError> {
        let (w, h) = frame.dims();
        for v in [w as u32, h as u32, CHANNELS as u32] {
            self.stdin.write_all(&v.to_le_bytes())?;
        }
        self.stdin.write_all(frame.as_bytes())?;
        self.stdin.flush()?;

        let line = self.read_line()?;
        parse_detection(&line, w, h, self.min_score)
    }
}

impl Drop for SubprocessLandmarker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation
// ════════════════════════════════════════════════════════════════════════════

/// Hand pose chosen from held keys in the preview window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SimPose {
    /// No hand in view.
    #[default]
    Hidden,
    /// Hand in view, all fingers extended (reads as idle).
    Open,
    Draw,
    Clear,
    Send,
}

impl SimPose {
    fn fingers(self) -> Option<FingerState> {
        match self {
            SimPose::Hidden => None,
            SimPose::Open   => Some(FingerState([true; 5])),
            SimPose::Draw   => Some(FingerState::DRAW),
            SimPose::Clear  => Some(FingerState::CLEAR),
            SimPose::Send   => Some(FingerState::SEND),
        }
    }
}

/// Raw input event from the preview window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse over the camera area, in frame pixels.
    Pointer { x: f32, y: f32 },
    /// Mouse left the camera area.
    PointerLost,
    Pose(SimPose),
}

/// A hand driven by [`SimInput`] events from the visualizer.
///
/// Events are drained on every `detect`, so the observation reflects the
/// latest window state.
pub struct SimLandmarker {
    rx:      Receiver<SimInput>,
    pointer: Option<(f32, f32)>,
    pose:    SimPose,
}

impl SimLandmarker {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarker { rx, pointer: None, pose: SimPose::Hidden }
    }

    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pointer { x, y }) => self.pointer = Some((x, y)),
                Ok(SimInput::PointerLost)      => self.pointer = None,
                Ok(SimInput::Pose(p))          => self.pose = p,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl HandLandmarker for SimLandmarker {
    fn detect(&mut self, _frame: &Raster) -> Result<Option<HandObservation>, DetectError> {
        self.drain();
        let (Some(fingers), Some((x, y))) = (self.pose.fingers(), self.pointer) else {
            return Ok(None);
        };
        Ok(Some(HandObservation {
            fingers,
            landmarks: synthetic_hand(x, y, fingers),
            handedness: Handedness::Right,
        }))
    }
}

/// Lay out 21 joints around an index fingertip at `(x, y)` so that the
/// geometry agrees with `fingers` under [`fingers_up`].
pub fn synthetic_hand(x: f32, y: f32, fingers: FingerState) -> LandmarkSet {
    let mut pts = vec![Landmark::new(x, y + 120.0); joints::COUNT];
    pts[joints::WRIST] = Landmark::new(x + 20.0, y + 160.0);

    // thumb: right hand, extended when the tip sits right of the IP joint
    let ip = Landmark::new(x - 40.0, y + 80.0);
    pts[joints::THUMB_IP] = ip;
    pts[joints::THUMB_TIP] = Landmark::new(ip.x + if fingers.0[0] { 15.0 } else { -15.0 }, ip.y);

    let fingers_cols = [
        (joints::INDEX_TIP,  joints::INDEX_PIP),
        (joints::MIDDLE_TIP, joints::MIDDLE_PIP),
        (joints::RING_TIP,   joints::RING_PIP),
        (joints::PINKY_TIP,  joints::PINKY_PIP),
    ];
    for (i, (tip, pip)) in fingers_cols.into_iter().enumerate() {
        let col = x + 18.0 * i as f32;
        pts[pip] = Landmark::new(col, y + 50.0);
        pts[tip] = Landmark::new(col, if fingers.0[i + 1] { y } else { y + 70.0 });
    }
    // the pointer is the index tip whatever the pose
    pts[joints::INDEX_TIP] = Landmark::new(x, pts[joints::INDEX_TIP].y);
    LandmarkSet(pts)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
