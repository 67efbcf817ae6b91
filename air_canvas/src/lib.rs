//! # air_canvas
//!
//! The drawing surface for air sketching: a packed RGB raster that strokes
//! accumulate on, plus the pure helpers that put it on screen.
//!
//! * [`stroke_to`] — paint a thick segment (or a dot, for a fresh sub-stroke)
//! * [`clear`] — wipe the surface back to all-zero
//! * [`composite`] — blend a live frame 70/30 with the canvas
//! * [`mirror`] — horizontal flip so the preview reads like a mirror
//!
//! No external image crates are needed here; encoding for transport lives
//! with the interpreter that needs it.

mod raster;

pub use raster::{CanvasError, Raster, CHANNELS};

// ════════════════════════════════════════════════════════════════════════════
// Point / StrokeStyle
// ════════════════════════════════════════════════════════════════════════════

/// A pixel position.  Signed so that a fingertip reported just outside the
/// frame still produces a correctly clipped stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Fixed color/width applied to every stroke segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeStyle {
    /// RGB.
    pub color: [u8; 3],
    /// Line thickness in pixels.
    pub width: u32,
}

/// Magenta, 10 px.
pub const DEFAULT_STYLE: StrokeStyle = StrokeStyle { color: [255, 0, 255], width: 10 };

impl Default for StrokeStyle {
    fn default() -> Self {
        DEFAULT_STYLE
    }
}

/// Live-frame weight in [`composite`]; the canvas gets the remainder.
pub const FRAME_WEIGHT: f32 = 0.7;
pub const CANVAS_WEIGHT: f32 = 0.3;

// ════════════════════════════════════════════════════════════════════════════
// Operations
// ════════════════════════════════════════════════════════════════════════════

/// Draw a straight segment from `previous` to `current` onto `canvas`.
///
/// A pixel is painted when its centre lies within `width / 2` of the
/// segment, which gives round caps and joins for free.  With `previous`
/// absent the segment collapses to a dot at `current`: a new sub-stroke
/// never reaches back to a stale position.
pub fn stroke_to(canvas: &mut Raster, previous: Option<Point>, current: Point, style: &StrokeStyle) {
    let from = previous.unwrap_or(current);
    let radius = f64::from(style.width.max(1)) / 2.0;
    let reach = radius.ceil() as i32;

    // a tracker can report a fingertip anywhere in i32 range
    let x_lo = from.x.min(current.x).saturating_sub(reach).max(0);
    let y_lo = from.y.min(current.y).saturating_sub(reach).max(0);
    let x_hi = from.x.max(current.x).saturating_add(reach).min(canvas.width() as i32 - 1);
    let y_hi = from.y.max(current.y).saturating_add(reach).min(canvas.height() as i32 - 1);
    if x_lo > x_hi || y_lo > y_hi {
        return;
    }

    let r2 = radius * radius;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if dist2_to_segment(f64::from(x), f64::from(y), from, current) <= r2 {
                canvas.put(x as usize, y as usize, style.color);
            }
        }
    }
}

/// Reset every pixel to zero.  Dimensions are unchanged.
pub fn clear(canvas: &mut Raster) {
    canvas.fill([0, 0, 0]);
}

/// Blend `frame` and `canvas` at a fixed 0.7 / 0.3 ratio, per channel,
/// rounding to nearest and saturating.  Both rasters must be the same size.
pub fn composite(frame: &Raster, canvas: &Raster) -> Result<Raster, CanvasError> {
    if frame.dims() != canvas.dims() {
        return Err(CanvasError::SizeMismatch {
            expected: frame.dims(),
            actual: canvas.dims(),
        });
    }
    let data = frame
        .as_bytes()
        .iter()
        .zip(canvas.as_bytes())
        .map(|(&f, &c)| blend_channel(f, c))
        .collect();
    Raster::from_rgb(frame.width(), frame.height(), data)
}

/// Flip a frame left-to-right.
pub fn mirror(frame: &Raster) -> Raster {
    let (w, h) = frame.dims();
    if w == 0 || h == 0 {
        return frame.clone();
    }
    let src = frame.as_bytes();
    let mut data = Vec::with_capacity(src.len());
    for row in src.chunks_exact(w * CHANNELS) {
        for px in row.chunks_exact(CHANNELS).rev() {
            data.extend_from_slice(px);
        }
    }
    Raster::from_parts(w, h, data)
}

// ────────────────────────────────────────────────────────────────────────────

fn blend_channel(frame: u8, canvas: u8) -> u8 {
    let v = frame as f32 * FRAME_WEIGHT + canvas as f32 * CANVAS_WEIGHT;
    v.round().clamp(0.0, 255.0) as u8
}

/// Squared distance from `(px, py)` to the closed segment `a..b`.
fn dist2_to_segment(px: f64, py: f64, a: Point, b: Point) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
