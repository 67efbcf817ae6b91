//! Top-level run loop.
//!
//! Wires a frame source, a hand landmarker, and the Gemini interpreter to a
//! [`Session`] and pushes every composited frame to the [`Visualizer`].
//! Everything happens on one thread: a dispatch blocks the loop until the
//! model answers.

use std::sync::mpsc;

use anyhow::{Context, Result};
use tracing::{error, info};

use air_canvas::mirror;
use air_gemini::GeminiInterpreter;
use air_gesture::{CaptureError, FrameSource, GestureSymbol, HandLandmarker, Session};

use crate::camera::{RawVideoSource, SyntheticCamera};
use crate::config::{AppConfig, Mode};
use crate::tracker::{SimLandmarker, SubprocessLandmarker};
use crate::visualizer::{Control, Visualizer};

/// Human-readable status line for a tick.
pub fn status_line(mode: &Mode, symbol: GestureSymbol, dispatched: bool, answered: bool) -> String {
    let mode = match mode {
        Mode::Simulation => "sim",
        Mode::Hardware { .. } => "camera",
    };
    let event = match (dispatched, symbol) {
        (true, _) => "sent to model",
        (false, GestureSymbol::Send) => "sent; release to send again",
        (false, GestureSymbol::Clear) => "canvas cleared",
        (false, GestureSymbol::Draw) => "drawing",
        (false, GestureSymbol::Idle) if answered => "answer ready",
        (false, GestureSymbol::Idle) => "ready",
    };
    format!("[{}] {}", mode, event)
}

/// Run the full application until the window closes, the user quits, or
/// the frame source ends.
pub fn run(cfg: AppConfig) -> Result<()> {
    let mode = cfg.mode();
    info!(?mode, width = cfg.width, height = cfg.height, model = %cfg.model, "starting air sketch");
    if cfg.api_key.is_none() {
        info!("GEMINI_API_KEY not set; send gestures will report an error");
    }

    // ── Frame source ──────────────────────────────────────────────────────
    let mut camera: Box<dyn FrameSource> = match &cfg.raw_video {
        Some(path) => Box::new(
            RawVideoSource::open(path, cfg.width, cfg.height)
                .with_context(|| format!("opening raw video {}", path))?,
        ),
        None => Box::new(SyntheticCamera::new(cfg.width, cfg.height)),
    };

    // ── Hand source (sim input channel only when simulating) ─────────────
    let mut sim_tx = None;
    let mut hands: Box<dyn HandLandmarker> = match &cfg.detector {
        Some(cmd) => Box::new(
            SubprocessLandmarker::spawn(cmd, cfg.confidence).context("starting detector")?,
        ),
        None => {
            let (tx, rx) = mpsc::channel();
            sim_tx = Some(tx);
            Box::new(SimLandmarker::new(rx))
        }
    };

    let mut interpreter = GeminiInterpreter::new(cfg.gemini()).context("building HTTP client")?;
    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)?;
    let mut session = Session::new(cfg.prompt.clone()).with_style(cfg.stroke_style());

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        match vis.poll_input() {
            Control::Quit => break,
            Control::Restart => {
                session.reset();
                info!("session restarted");
            }
            Control::Continue => {}
        }

        let frame = match camera.next_frame() {
            Ok(f) => f,
            Err(CaptureError::EndOfStream) => {
                info!("video stream ended");
                break;
            }
            Err(e) => {
                error!(error = %e, "camera could not be read");
                return Err(e).context("capturing frame");
            }
        };
        let frame = if cfg.mirror { mirror(&frame) } else { frame };

        let detection = hands.detect(&frame);
        let out = session.tick(&frame, detection, &mut interpreter)?;

        let status = status_line(&mode, out.symbol, out.dispatched, out.answer.is_some());
        vis.render(&out.display, out.landmarks.as_ref(), out.symbol, out.answer.as_deref(), &status);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_dispatch_first() {
        let s = status_line(&Mode::Simulation, GestureSymbol::Send, true, true);
        assert_eq!(s, "[sim] sent to model");
    }

    #[test]
    fn status_held_send_hints_release() {
        let s = status_line(&Mode::Simulation, GestureSymbol::Send, false, true);
        assert_eq!(s, "[sim] sent; release to send again");
    }

    #[test]
    fn status_idle_depends_on_answer() {
        let hw = Mode::Hardware { raw_video: Some("-".into()), detector: None };
        assert_eq!(status_line(&hw, GestureSymbol::Idle, false, false), "[camera] ready");
        assert_eq!(status_line(&hw, GestureSymbol::Idle, false, true), "[camera] answer ready");
    }
}
