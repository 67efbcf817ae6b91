//! Hand observations and the finger-state → gesture classifier.
//!
//! The classifier is an exact match over the five extension flags; there are
//! no thresholds here.  Near-miss poses simply read as [`GestureSymbol::Idle`].

use air_canvas::Point;

// ════════════════════════════════════════════════════════════════════════════
// Joint indices (21-point hand model)
// ════════════════════════════════════════════════════════════════════════════

pub mod joints {
    pub const WRIST: usize      = 0;
    pub const THUMB_IP: usize   = 3;
    pub const THUMB_TIP: usize  = 4;
    pub const INDEX_PIP: usize  = 6;
    pub const INDEX_TIP: usize  = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize   = 14;
    pub const RING_TIP: usize   = 16;
    pub const PINKY_PIP: usize  = 18;
    pub const PINKY_TIP: usize  = 20;

    /// Number of joints a complete observation carries.
    pub const COUNT: usize = 21;
}

// ════════════════════════════════════════════════════════════════════════════
// FingerState
// ════════════════════════════════════════════════════════════════════════════

/// Extension flags, thumb first, pinky last.  `true` = extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    pub const DRAW:  FingerState = FingerState([false, true,  false, false, false]);
    pub const CLEAR: FingerState = FingerState([true,  false, false, false, false]);
    pub const SEND:  FingerState = FingerState([true,  true,  true,  true,  false]);

    /// Build from detector-style 0/1 flags.  Anything but exactly five
    /// entries is rejected; any non-zero entry counts as extended.
    pub fn from_flags(flags: &[u8]) -> Option<Self> {
        let arr: [u8; 5] = flags.try_into().ok()?;
        Some(FingerState(arr.map(|f| f != 0)))
    }

    pub fn flags(&self) -> [u8; 5] {
        self.0.map(u8::from)
    }

    pub fn gesture(&self) -> GestureSymbol {
        classify(Some(self))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSymbol / classify
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GestureSymbol {
    /// Index finger only: the fingertip draws.
    Draw,
    /// Thumb only: wipe the canvas.
    Clear,
    /// All but the pinky: send the canvas for interpretation.
    Send,
    /// Anything else, including no hand.
    #[default]
    Idle,
}

impl GestureSymbol {
    pub fn name(&self) -> &'static str {
        match self {
            GestureSymbol::Draw  => "DRAW",
            GestureSymbol::Clear => "CLEAR",
            GestureSymbol::Send  => "SEND",
            GestureSymbol::Idle  => "IDLE",
        }
    }
}

/// Map a finger state to a gesture.  `None` means no hand this tick.
pub fn classify(fingers: Option<&FingerState>) -> GestureSymbol {
    match fingers {
        Some(&FingerState::DRAW)  => GestureSymbol::Draw,
        Some(&FingerState::CLEAR) => GestureSymbol::Clear,
        Some(&FingerState::SEND)  => GestureSymbol::Send,
        _                         => GestureSymbol::Idle,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// A joint position in frame pixels.  `z` is relative depth and unused by
/// the drawing logic.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }
}

/// Ordered joints of one hand, index-addressable.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LandmarkSet(pub Vec<Landmark>);

impl LandmarkSet {
    pub fn get(&self, joint: usize) -> Option<&Landmark> {
        self.0.get(joint)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The drawing pointer: the index fingertip, rounded to a pixel.
    pub fn pointer(&self) -> Option<Point> {
        self.get(joints::INDEX_TIP)
            .map(|lm| Point::new(lm.x.round() as i32, lm.y.round() as i32))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    /// Parse a detector label; anything not starting with `l`/`L` is Right.
    pub fn from_label(label: &str) -> Self {
        if label.trim_start().to_ascii_lowercase().starts_with('l') {
            Handedness::Left
        } else {
            Handedness::Right
        }
    }
}

/// Everything the landmark capability reports about the one tracked hand.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HandObservation {
    pub fingers:    FingerState,
    pub landmarks:  LandmarkSet,
    pub handedness: Handedness,
}

impl HandObservation {
    pub fn gesture(&self) -> GestureSymbol {
        self.fingers.gesture()
    }
}

/// Derive extension flags from joint geometry, for detectors that report
/// landmarks only.
///
/// Thumb: compared horizontally against its IP joint (direction depends on
/// which hand).  Other fingers: extended when the tip is above the PIP joint
/// in image space.  Needs the full 21-joint set.
pub fn fingers_up(landmarks: &LandmarkSet, handedness: Handedness) -> Option<FingerState> {
    if landmarks.len() < joints::COUNT {
        return None;
    }
    let lm = &landmarks.0;
    let tip = lm[joints::THUMB_TIP].x;
    let ip  = lm[joints::THUMB_IP].x;
    let thumb = match handedness {
        Handedness::Right => tip > ip,
        Handedness::Left  => tip < ip,
    };
    let up = |tip: usize, pip: usize| lm[tip].y < lm[pip].y;
    Some(FingerState([
        thumb,
        up(joints::INDEX_TIP,  joints::INDEX_PIP),
        up(joints::MIDDLE_TIP, joints::MIDDLE_PIP),
        up(joints::RING_TIP,   joints::RING_PIP),
        up(joints::PINKY_TIP,  joints::PINKY_PIP),
    ]))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn state(bits: u8) -> FingerState {
        FingerState(std::array::from_fn(|i| bits & (1 << (4 - i)) != 0))
    }

    #[test]
    fn named_poses_classify() {
        assert_eq!(classify(Some(&FingerState::DRAW)),  GestureSymbol::Draw);
        assert_eq!(classify(Some(&FingerState::CLEAR)), GestureSymbol::Clear);
        assert_eq!(classify(Some(&FingerState::SEND)),  GestureSymbol::Send);
    }

    #[test]
    fn no_hand_is_idle() {
        assert_eq!(classify(None), GestureSymbol::Idle);
    }

    #[test]
    fn every_other_vector_is_idle() {
        let named = [FingerState::DRAW, FingerState::CLEAR, FingerState::SEND];
        let mut idle = 0;
        for bits in 0u8..32 {
            let s = state(bits);
            if named.contains(&s) {
                assert_ne!(classify(Some(&s)), GestureSymbol::Idle);
            } else {
                assert_eq!(classify(Some(&s)), GestureSymbol::Idle, "{:?}", s);
                idle += 1;
            }
        }
        assert_eq!(idle, 29);
    }

    #[test]
    fn from_flags_requires_five() {
        assert_eq!(FingerState::from_flags(&[0, 1, 0, 0, 0]), Some(FingerState::DRAW));
        assert_eq!(FingerState::from_flags(&[0, 1, 0, 0]), None);
        assert_eq!(FingerState::from_flags(&[0, 1, 0, 0, 0, 0]), None);
        assert_eq!(FingerState::SEND.flags(), [1, 1, 1, 1, 0]);
    }

    #[test]
    fn pointer_is_index_tip() {
        let mut pts = vec![Landmark::default(); 21];
        pts[8] = Landmark::new(12.6, 40.2);
        assert_eq!(LandmarkSet(pts).pointer(), Some(Point::new(13, 40)));
        assert_eq!(LandmarkSet(vec![Landmark::default(); 8]).pointer(), None);
    }

    #[test]
    fn handedness_labels() {
        assert_eq!(Handedness::from_label("Left"), Handedness::Left);
        assert_eq!(Handedness::from_label("right"), Handedness::Right);
        assert_eq!(Handedness::from_label(""), Handedness::Right);
    }

    /// A hand with every finger curled: tips below their PIP joints and the
    /// thumb tip tucked toward the palm for a right hand.
    fn fist() -> Vec<Landmark> {
        let mut pts = vec![Landmark::new(100.0, 100.0); 21];
        pts[joints::THUMB_IP]  = Landmark::new(100.0, 100.0);
        pts[joints::THUMB_TIP] = Landmark::new(90.0, 100.0);
        for (tip, pip) in [(8, 6), (12, 10), (16, 14), (20, 18)] {
            pts[pip] = Landmark::new(100.0, 80.0);
            pts[tip] = Landmark::new(100.0, 90.0);
        }
        pts
    }

    #[test]
    fn fingers_up_index_only() {
        let mut pts = fist();
        pts[joints::INDEX_TIP].y = 40.0;
        let fs = fingers_up(&LandmarkSet(pts), Handedness::Right).unwrap();
        assert_eq!(fs, FingerState::DRAW);
    }

    #[test]
    fn fingers_up_thumb_depends_on_hand() {
        let mut pts = fist();
        pts[joints::THUMB_TIP].x = 120.0;
        let set = LandmarkSet(pts);
        assert_eq!(fingers_up(&set, Handedness::Right), Some(FingerState::CLEAR));
        assert_eq!(fingers_up(&set, Handedness::Left),  Some(FingerState([false; 5])));
    }

    #[test]
    fn fingers_up_needs_full_hand() {
        assert_eq!(fingers_up(&LandmarkSet(vec![Landmark::default(); 20]), Handedness::Right), None);
    }
}
