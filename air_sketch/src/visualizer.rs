//! Software-rendered preview window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────┐
//! │                                              │  ANSWER      │
//! │   live frame 70% + canvas 30%                │              │
//! │                                              │  wrapped     │
//! │                                              │  model text  │
//! │                                              │              │
//! ├──────────────────────────────────────────────┤              │
//! │  status: gesture, mode, last event           │  key legend  │
//! └──────────────────────────────────────────────┴──────────────┘
//! ```
//!
//! In simulation mode the window also acts as the "hand": mouse position
//! and held keys are forwarded as [`SimInput`] events.

use std::sync::mpsc::Sender;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use air_canvas::Raster;
use air_gesture::{joints, GestureSymbol, LandmarkSet};

use crate::font::{self, ADVANCE, LINE};
use crate::tracker::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const PANEL_W:      usize = 360;
const STATUS_H:     usize = 40;
const TEXT_SCALE:   usize = 2;
const PAD:          usize = 12;
const BG_COLOR:     u32   = 0xFF1A1A2E;
const PANEL_BG:     u32   = 0xFF16213E;
const STATUS_BG:    u32   = 0xFF0F3460;
const TITLE_COLOR:  u32   = 0xFFFFD700;
const TEXT_COLOR:   u32   = 0xFFEEEEEE;
const LEGEND_COLOR: u32   = 0xFF888888;
const ERROR_COLOR:  u32   = 0xFFFF6666;
const JOINT_COLOR:  u32   = 0xFF00FF7F;
const TIP_COLOR:    u32   = 0xFFFFD700;
const JOINT_R:      usize = 2;
const TIP_R:        usize = 6;

/// What the run loop should do after polling the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Drop the canvas and answer and start over.
    Restart,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    buf:     Vec<u32>,
    frame_w: usize,
    frame_h: usize,
    win_w:   usize,
    win_h:   usize,
    /// `None` when hands come from a real detector.
    sim_tx:  Option<Sender<SimInput>>,
    last_pose: SimPose,
}

impl Visualizer {
    pub fn new(frame_w: usize, frame_h: usize, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let win_w = frame_w + PANEL_W;
        let win_h = frame_h + STATUS_H;
        let mut window = Window::new(
            "Air Sketch — draw with one finger, send with four",
            win_w,
            win_h,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| anyhow!("cannot open preview window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; win_w * win_h],
            frame_w,
            frame_h,
            win_w,
            win_h,
            sim_tx,
            last_pose: SimPose::Hidden,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Read the keyboard/mouse.  In simulation mode this also forwards the
    /// pointer and the pose selected by held keys.
    pub fn poll_input(&mut self) -> Control {
        if !self.window.is_open()
            || self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            return Control::Quit;
        }
        let restart = self.window.is_key_pressed(Key::R, KeyRepeat::No);

        if let Some(tx) = &self.sim_tx {
            let pointer = self
                .window
                .get_mouse_pos(MouseMode::Discard)
                .filter(|&(x, y)| (x as usize) < self.frame_w && (y as usize) < self.frame_h);
            let _ = tx.send(match pointer {
                Some((x, y)) => SimInput::Pointer { x, y },
                None => SimInput::PointerLost,
            });

            let down = |k| self.window.is_key_down(k);
            let pose = if down(Key::S) {
                SimPose::Send
            } else if down(Key::C) {
                SimPose::Clear
            } else if down(Key::D) {
                SimPose::Draw
            } else if down(Key::H) {
                SimPose::Open
            } else {
                SimPose::Hidden
            };
            if pose != self.last_pose {
                let _ = tx.send(SimInput::Pose(pose));
                self.last_pose = pose;
            }
        }

        if restart { Control::Restart } else { Control::Continue }
    }

    /// Render one frame.  `hand` is overlaid on the window only; the
    /// display raster is left untouched.
    pub fn render(
        &mut self,
        display: &Raster,
        hand: Option<&LandmarkSet>,
        symbol: GestureSymbol,
        answer: Option<&str>,
        status: &str,
    ) {
        self.buf.fill(BG_COLOR);

        // ── Camera + canvas ───────────────────────────────────────────────
        display.blit_xrgb(&mut self.buf, self.win_w);

        // ── Hand overlay ──────────────────────────────────────────────────
        if let Some(hand) = hand {
            for lm in &hand.0 {
                if let Some((x, y)) = self.frame_pos(lm.x, lm.y) {
                    let d = 2 * JOINT_R + 1;
                    self.fill_rect(x.saturating_sub(JOINT_R), y.saturating_sub(JOINT_R), d, d, JOINT_COLOR);
                }
            }
            if let Some(tip) = hand.get(joints::INDEX_TIP) {
                if let Some((x, y)) = self.frame_pos(tip.x, tip.y) {
                    self.outline_rect(x.saturating_sub(TIP_R), y.saturating_sub(TIP_R), 2 * TIP_R + 1, TIP_COLOR);
                }
            }
        }

        // ── Answer panel ──────────────────────────────────────────────────
        let px = self.frame_w;
        self.fill_rect(px, 0, PANEL_W, self.win_h, PANEL_BG);
        self.draw_text("ANSWER", px + PAD, PAD, TITLE_COLOR, TEXT_SCALE + 1);

        let cols = (PANEL_W - 2 * PAD) / (ADVANCE * TEXT_SCALE);
        let color = match answer {
            Some(a) if a.starts_with("Error") => ERROR_COLOR,
            _ => TEXT_COLOR,
        };
        let mut y = PAD + LINE * (TEXT_SCALE + 1) + PAD;
        let bottom = self.win_h.saturating_sub(STATUS_H + PAD);
        for line in font::wrap(answer.unwrap_or("(hold four fingers up to send)"), cols) {
            if y + LINE * TEXT_SCALE > bottom {
                self.draw_text("...", px + PAD, y, color, TEXT_SCALE);
                break;
            }
            self.draw_text(&line, px + PAD, y, color, TEXT_SCALE);
            y += LINE * TEXT_SCALE;
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, self.frame_h, self.frame_w, STATUS_H, STATUS_BG);
        let gesture = format!("{:<5}  {}", symbol.name(), status);
        self.draw_text(&gesture, PAD, self.frame_h + 8, TEXT_COLOR, TEXT_SCALE);

        // ── Key legend ────────────────────────────────────────────────────
        let legend = if self.sim_tx.is_some() {
            "D=draw C=clear S=send H=hand R=restart Q=quit"
        } else {
            "R=restart Q=quit"
        };
        self.draw_text(legend, px + PAD, self.win_h - STATUS_H + 8, LEGEND_COLOR, 1);

        self.window.update_with_buffer(&self.buf, self.win_w, self.win_h).ok();
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    /// Landmark position in window pixels, if it lies on the camera area.
    fn frame_pos(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let (x, y) = (x.round(), y.round());
        let on_frame = x >= 0.0 && y >= 0.0 && x < self.frame_w as f32 && y < self.frame_h as f32;
        on_frame.then(|| (x as usize, y as usize))
    }

    fn outline_rect(&mut self, x: usize, y: usize, size: usize, color: u32) {
        let far = size.saturating_sub(1);
        self.fill_rect(x, y, size, 1, color);
        self.fill_rect(x, y + far, size, 1, color);
        self.fill_rect(x, y, 1, size, color);
        self.fill_rect(x + far, y, 1, size, color);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.win_h) {
            let base = row * self.win_w;
            for col in x..(x + w).min(self.win_w) {
                self.buf[base + col] = color;
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + ADVANCE * scale > self.win_w {
                break;
            }
            for (row, &bits) in font::glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += ADVANCE * scale;
        }
    }
}
