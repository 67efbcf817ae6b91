//! Frame loop controller.
//!
//! `Session` owns everything that outlives a single frame: the canvas, the
//! previous fingertip position, the dispatch gate, and the last answer.
//! [`Session::tick`] runs one frame through classify → stroke/clear →
//! debounce → (maybe) interpret → composite.

use air_canvas::{Point, Raster, StrokeStyle};
use tracing::{debug, info, warn};

use crate::capability::Interpreter;
use crate::debounce::DispatchGate;
use crate::error::{CaptureError, DetectError};
use crate::gesture::{GestureSymbol, HandObservation, LandmarkSet};

/// Instruction sent alongside the canvas when none is configured.
pub const DEFAULT_PROMPT: &str = "Analyze the drawing and provide a text response.";

/// What one tick produced for the display sink.
#[derive(Clone, Debug)]
pub struct TickOutput {
    /// 70/30 blend of the live frame and the canvas.
    pub display: Raster,
    pub symbol: GestureSymbol,
    /// True on the tick that called the interpreter.
    pub dispatched: bool,
    /// Latest interpreter text (or error message), held until overwritten.
    pub answer: Option<String>,
    /// This frame's hand joints, for overlay only.  Never painted on the
    /// canvas.
    pub landmarks: Option<LandmarkSet>,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session {
    // ── drawing ──────────────────────────────────────────────────────────
    canvas: Option<Raster>,
    trace:  Option<Point>,
    style:  StrokeStyle,

    // ── dispatch ─────────────────────────────────────────────────────────
    gate:   DispatchGate,
    prompt: String,
    answer: Option<String>,

    last_symbol: GestureSymbol,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(DEFAULT_PROMPT)
    }
}

impl Session {
    pub fn new(prompt: impl Into<String>) -> Self {
        Session {
            canvas: None,
            trace:  None,
            style:  StrokeStyle::default(),
            gate:   DispatchGate::default(),
            prompt: prompt.into(),
            answer: None,
            last_symbol: GestureSymbol::Idle,
        }
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    // ── one frame ────────────────────────────────────────────────────────

    /// Process one frame.
    ///
    /// `detection` is whatever the landmark capability returned; an `Err`
    /// is logged and treated exactly like "no hand".  The only error that
    /// escapes is a frame whose size differs from the first one.
    pub fn tick<I>(
        &mut self,
        frame: &Raster,
        detection: Result<Option<HandObservation>, DetectError>,
        interpreter: &mut I,
    ) -> Result<TickOutput, CaptureError>
    where
        I: Interpreter + ?Sized,
    {
        // 1. canvas follows the first frame's size
        let canvas = self.canvas.get_or_insert_with(|| {
            debug!(width = frame.width(), height = frame.height(), "canvas initialised");
            Raster::blank(frame.width(), frame.height())
        });
        if canvas.dims() != frame.dims() {
            return Err(CaptureError::FrameSizeChanged {
                expected: canvas.dims(),
                actual: frame.dims(),
            });
        }

        // 2. classify
        let hand = match detection {
            Ok(hand) => hand,
            Err(e) => {
                warn!(error = %e, "hand detection failed; treating as no hand");
                None
            }
        };
        let symbol = hand.as_ref().map_or(GestureSymbol::Idle, HandObservation::gesture);
        if hand.is_none() {
            self.trace = None;
            self.gate.rearm();
        }

        // 3/4. stroke or break the trace
        match (symbol, hand.as_ref().and_then(|h| h.landmarks.pointer())) {
            (GestureSymbol::Draw, Some(pt)) => {
                air_canvas::stroke_to(canvas, self.trace, pt, &self.style);
                self.trace = Some(pt);
            }
            (GestureSymbol::Draw, None) => {
                debug!("draw pose without an index fingertip; skipping");
                self.trace = None;
            }
            _ => self.trace = None,
        }

        // 5. clear
        if symbol == GestureSymbol::Clear {
            air_canvas::clear(canvas);
            if self.last_symbol != GestureSymbol::Clear {
                info!("canvas cleared");
            }
        }

        // 6. debounce + dispatch
        let mut dispatched = false;
        if let Some(request) = self.gate.observe(symbol, canvas) {
            info!(inked = request.snapshot.inked_pixels(), "dispatching canvas for interpretation");
            let text = match interpreter.interpret(&request.snapshot, &self.prompt) {
                Ok(text) => {
                    info!(chars = text.len(), "interpretation received");
                    text
                }
                Err(e) => {
                    warn!(error = %e, "interpretation failed");
                    format!("Error occurred during AI request: {}", e)
                }
            };
            self.answer = Some(text);
            dispatched = true;
        }

        if symbol != self.last_symbol {
            debug!(from = self.last_symbol.name(), to = symbol.name(), "gesture changed");
            self.last_symbol = symbol;
        }

        // 7. composite
        let display = air_canvas::composite(frame, canvas)?;

        Ok(TickOutput {
            display,
            symbol,
            dispatched,
            answer: self.answer.clone(),
            landmarks: hand.map(|h| h.landmarks),
        })
    }

    /// Drop all session state, as on a restart.  The next frame sizes a new
    /// canvas.
    pub fn reset(&mut self) {
        self.canvas = None;
        self.trace = None;
        self.gate = DispatchGate::default();
        self.answer = None;
        self.last_symbol = GestureSymbol::Idle;
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn canvas(&self)      -> Option<&Raster> { self.canvas.as_ref() }
    pub fn trace(&self)       -> Option<Point>   { self.trace }
    pub fn gate(&self)        -> DispatchGate    { self.gate }
    pub fn answer(&self)      -> Option<&str>    { self.answer.as_deref() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::gesture::{FingerState, Landmark, LandmarkSet};

    const W: usize = 120;
    const H: usize = 80;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Raster, String)>,
        fail: bool,
    }

    impl Interpreter for Recorder {
        fn interpret(&mut self, snapshot: &Raster, prompt: &str) -> Result<String, DispatchError> {
            self.calls.push((snapshot.clone(), prompt.to_string()));
            if self.fail {
                Err(DispatchError::Transport("connection refused".into()))
            } else {
                Ok(format!("answer #{}", self.calls.len()))
            }
        }
    }

    fn hand(fingers: FingerState, tip: (f32, f32)) -> Option<HandObservation> {
        let mut pts = vec![Landmark::default(); 21];
        pts[8] = Landmark::new(tip.0, tip.1);
        Some(HandObservation { fingers, landmarks: LandmarkSet(pts), ..Default::default() })
    }

    fn draw(x: f32, y: f32) -> Option<HandObservation> { hand(FingerState::DRAW, (x, y)) }
    fn clear() -> Option<HandObservation>              { hand(FingerState::CLEAR, (0.0, 0.0)) }
    fn send() -> Option<HandObservation>               { hand(FingerState::SEND, (0.0, 0.0)) }

    fn frame() -> Raster { Raster::filled(W, H, [40, 40, 40]) }

    fn step(s: &mut Session, ai: &mut Recorder, obs: Option<HandObservation>) -> TickOutput {
        s.tick(&frame(), Ok(obs), ai).unwrap()
    }

    fn inked(s: &Session, x: usize, y: usize) -> bool {
        s.canvas().and_then(|c| c.pixel(x, y)).map_or(false, |px| px != [0, 0, 0])
    }

    #[test]
    fn first_frame_sizes_canvas() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        assert!(s.canvas().is_none());
        step(&mut s, &mut ai, None);
        assert_eq!(s.canvas().unwrap().dims(), (W, H));
        assert!(s.canvas().unwrap().is_blank());
    }

    #[test]
    fn frame_size_change_is_fatal() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, None);
        let err = s.tick(&Raster::blank(W + 1, H), Ok(None), &mut ai).unwrap_err();
        assert!(matches!(err, CaptureError::FrameSizeChanged { expected: (W, H), .. }));
    }

    #[test]
    fn consecutive_draws_connect() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 40.0));
        step(&mut s, &mut ai, draw(100.0, 40.0));
        assert!(inked(&s, 55, 40));
        assert_eq!(s.trace(), Some(Point::new(100, 40)));
    }

    #[test]
    fn idle_gap_splits_strokes() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 20.0));
        step(&mut s, &mut ai, draw(30.0, 20.0));
        step(&mut s, &mut ai, hand(FingerState([true; 5]), (0.0, 0.0)));
        assert_eq!(s.trace(), None);
        step(&mut s, &mut ai, draw(100.0, 70.0));
        // both sub-strokes present
        assert!(inked(&s, 20, 20));
        assert!(inked(&s, 100, 70));
        // nothing between (30,20) and (100,70)
        assert!(!inked(&s, 65, 45));
    }

    #[test]
    fn lost_hand_splits_strokes() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 10.0));
        step(&mut s, &mut ai, None);
        step(&mut s, &mut ai, draw(110.0, 70.0));
        assert!(!inked(&s, 60, 40));
    }

    #[test]
    fn landmarks_pass_through_without_inking() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        let out = step(&mut s, &mut ai, hand(FingerState([true; 5]), (30.0, 20.0)));
        let joints = out.landmarks.expect("hand landmarks");
        assert_eq!(joints.pointer(), Some(Point::new(30, 20)));
        assert!(s.canvas().unwrap().is_blank());

        assert!(step(&mut s, &mut ai, None).landmarks.is_none());
    }

    #[test]
    fn far_out_fingertip_is_clipped_not_fatal() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(1.0e12, 40.0));
        step(&mut s, &mut ai, draw(f32::NEG_INFINITY, 40.0));
        let out = step(&mut s, &mut ai, draw(60.0, f32::NAN));
        assert_eq!(out.symbol, GestureSymbol::Draw);
        assert_eq!(s.trace(), Some(Point::new(60, 0)));
        // the i32::MAX -> i32::MIN segment runs straight across row 40
        assert!(inked(&s, 60, 40));
    }

    #[test]
    fn detection_error_is_no_hand() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 10.0));
        let out = s
            .tick(&frame(), Err(DetectError::Protocol("garbled".into())), &mut ai)
            .unwrap();
        assert_eq!(out.symbol, GestureSymbol::Idle);
        assert_eq!(s.trace(), None);
        step(&mut s, &mut ai, draw(110.0, 70.0));
        assert!(!inked(&s, 60, 40));
    }

    #[test]
    fn draw_without_fingertip_breaks_trace() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 10.0));
        let stub = HandObservation { fingers: FingerState::DRAW, ..Default::default() };
        step(&mut s, &mut ai, Some(stub));
        assert_eq!(s.trace(), None);
    }

    #[test]
    fn clear_wipes_and_restarts_stroke() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 10.0));
        step(&mut s, &mut ai, draw(60.0, 10.0));
        step(&mut s, &mut ai, clear());
        assert!(s.canvas().unwrap().is_blank());
        assert_eq!(s.trace(), None);
        step(&mut s, &mut ai, draw(100.0, 70.0));
        assert!(inked(&s, 100, 70));
        assert!(!inked(&s, 60, 10));
        assert!(!inked(&s, 80, 40));
    }

    #[test]
    fn held_send_dispatches_once() {
        let mut s = Session::new("solve it");
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(20.0, 20.0));
        let outs: Vec<_> = (0..5).map(|_| step(&mut s, &mut ai, send())).collect();
        assert_eq!(ai.calls.len(), 1);
        assert_eq!(ai.calls[0].1, "solve it");
        assert!(outs[0].dispatched);
        assert!(outs[1..].iter().all(|o| !o.dispatched));
        assert!(outs.iter().all(|o| o.answer.as_deref() == Some("answer #1")));
    }

    #[test]
    fn send_draw_send_dispatches_twice() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, send());
        step(&mut s, &mut ai, draw(20.0, 20.0));
        step(&mut s, &mut ai, send());
        assert_eq!(ai.calls.len(), 2);
        assert_eq!(s.answer(), Some("answer #2"));
    }

    #[test]
    fn lost_hand_rearms_gate() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, send());
        assert_eq!(s.gate(), DispatchGate::Fired);
        step(&mut s, &mut ai, None);
        assert!(s.gate().is_armed());
        step(&mut s, &mut ai, send());
        assert_eq!(ai.calls.len(), 2);
    }

    #[test]
    fn failed_dispatch_shows_error_and_stays_fired() {
        let mut s = Session::default();
        let mut ai = Recorder { fail: true, ..Default::default() };
        let out = step(&mut s, &mut ai, send());
        assert!(out.dispatched);
        assert_eq!(
            out.answer.as_deref(),
            Some("Error occurred during AI request: request failed: connection refused")
        );
        assert_eq!(s.gate(), DispatchGate::Fired);
        step(&mut s, &mut ai, send());
        assert_eq!(ai.calls.len(), 1);
    }

    #[test]
    fn answer_persists_until_next_dispatch() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, send());
        for _ in 0..3 {
            let out = step(&mut s, &mut ai, None);
            assert_eq!(out.answer.as_deref(), Some("answer #1"));
        }
    }

    #[test]
    fn display_is_composite() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        let out = step(&mut s, &mut ai, draw(60.0, 40.0));
        assert_eq!(out.symbol, GestureSymbol::Draw);
        // 0.7 * 40 + 0.3 * 255 = 104.5 → 105 ; 0.7 * 40 = 28
        assert_eq!(out.display.pixel(60, 40), Some([105, 28, 105]));
        assert_eq!(out.display.pixel(0, 0), Some([28, 28, 28]));
    }

    #[test]
    fn reset_drops_everything() {
        let mut s = Session::default();
        let mut ai = Recorder::default();
        step(&mut s, &mut ai, draw(10.0, 10.0));
        step(&mut s, &mut ai, send());
        s.reset();
        assert!(s.canvas().is_none());
        assert!(s.answer().is_none());
        assert!(s.gate().is_armed());
        assert_eq!(s.trace(), None);
    }
}
