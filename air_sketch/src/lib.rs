//! # air_sketch
//!
//! Draw in the air with one finger in front of a camera; hold up four
//! fingers to have the sketch interpreted by Gemini.
//!
//! ## Gestures
//!
//! | Fingers (thumb..pinky) | Action |
//! |---|---|
//! | index only | Draw with the index fingertip |
//! | thumb only | Clear the canvas |
//! | all but pinky | Send the canvas (once per hold) |
//!
//! ## Modes
//!
//! * (default) **Simulation**: synthetic backdrop; the mouse is the
//!   fingertip and held keys choose the pose.
//! * **Camera**: `--raw-video` feeds `rgb24` frames (e.g. piped from
//!   ffmpeg) and `--detector` runs an external landmark model.
//!
//! ### Simulation keys
//!
//! | Key (held) | Pose |
//! |---|---|
//! | `D` | Draw |
//! | `C` | Clear |
//! | `S` | Send |
//! | `H` | Open hand (idle) |
//! | none | No hand in view |
//!
//! `R` restarts the session, `Q`/`Esc` quits.

pub mod app;
pub mod camera;
pub mod config;
pub mod font;
pub mod tracker;
pub mod visualizer;
