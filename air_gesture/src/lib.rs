//! # air_gesture
//!
//! Turns a stream of per-frame hand observations into a persistent drawing
//! and a debounced request to interpret it.
//!
//! ## Gesture → Action mapping
//!
//! | Fingers (thumb..pinky) | Gesture | Action |
//! |---|---|---|
//! | `0 1 0 0 0` | Draw  | Index fingertip strokes onto the canvas |
//! | `1 0 0 0 0` | Clear | Canvas wiped to black |
//! | `1 1 1 1 0` | Send  | Canvas snapshot sent to the interpreter, once per hold |
//! | anything else / no hand | Idle | Stroke ends; send gate re-arms |
//!
//! ## Per-frame flow
//!
//! ```text
//! frame ─► HandLandmarker ─► classify ─┬─► stroke_to / clear ─► canvas
//!                                      └─► DispatchGate ─► Interpreter ─► answer
//! frame + canvas ─► composite ─► display
//! ```
//!
//! [`Session`] owns all state that survives between frames.  The camera,
//! detector, and interpreter are reached only through the traits in
//! [`capability`].

pub mod capability;
pub mod debounce;
pub mod error;
pub mod gesture;
pub mod session;

pub use capability::{FrameSource, HandLandmarker, Interpreter};
pub use debounce::{DispatchGate, DispatchRequest};
pub use error::{CaptureError, DetectError, DispatchError};
pub use gesture::{
    classify, fingers_up, joints, FingerState, GestureSymbol, HandObservation, Handedness,
    Landmark, LandmarkSet,
};
pub use session::{Session, TickOutput, DEFAULT_PROMPT};
