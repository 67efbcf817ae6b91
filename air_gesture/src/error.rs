//! Failure taxonomy for a drawing session.
//!
//! Only [`CaptureError`] is fatal.  Detection and dispatch failures are
//! absorbed inside a tick so a flaky detector or network never corrupts the
//! drawing.

use std::io;

use air_canvas::CanvasError;
use thiserror::Error;

/// The frame source could not produce a usable frame.  Ends the loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("video stream ended")]
    EndOfStream,
    #[error("camera read failed: {0}")]
    Io(#[from] io::Error),
    #[error("frame size changed from {expected:?} to {actual:?}")]
    FrameSizeChanged {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] CanvasError),
}

/// The landmark capability failed this tick.  Treated as "no hand".
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to start detector `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("detector pipe error: {0}")]
    Io(#[from] io::Error),
    #[error("detector protocol error: {0}")]
    Protocol(String),
    #[error("detector reported: {0}")]
    Detector(String),
}

/// The interpreter call failed.  Surfaced to the user as answer text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("could not encode canvas snapshot: {0}")]
    Encode(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("service returned no text")]
    EmptyResponse,
}
