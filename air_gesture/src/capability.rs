//! The three outside capabilities the session is driven by.
//!
//! The run loop doesn't care whether frames come from a real camera or a
//! synthetic backdrop, or whether the hand is tracked by a detector process
//! or simulated from the mouse; it only sees these traits.

use air_canvas::Raster;

use crate::error::{CaptureError, DetectError, DispatchError};
use crate::gesture::HandObservation;

/// Yields fixed-size colour frames.  An error ends the session.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Raster, CaptureError>;
}

/// Finds at most one hand in a frame.
pub trait HandLandmarker {
    fn detect(&mut self, frame: &Raster) -> Result<Option<HandObservation>, DetectError>;
}

/// Turns a canvas snapshot plus an instruction into text.  Blocking.
pub trait Interpreter {
    fn interpret(&mut self, snapshot: &Raster, prompt: &str) -> Result<String, DispatchError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Result<Raster, CaptureError> {
        (**self).next_frame()
    }
}

impl<T: HandLandmarker + ?Sized> HandLandmarker for Box<T> {
    fn detect(&mut self, frame: &Raster) -> Result<Option<HandObservation>, DetectError> {
        (**self).detect(frame)
    }
}

impl<T: Interpreter + ?Sized> Interpreter for Box<T> {
    fn interpret(&mut self, snapshot: &Raster, prompt: &str) -> Result<String, DispatchError> {
        (**self).interpret(snapshot, prompt)
    }
}
