//! At-most-once-per-gesture dispatch gate.
//!
//! Holding the SEND pose for many frames must produce one request, not one
//! per frame.  The gate fires on the first SEND tick and stays quiet until
//! the pose is broken (any other gesture, or the hand leaving the frame).

use air_canvas::Raster;

use crate::gesture::GestureSymbol;

/// A request to interpret the canvas as it was on the firing tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Owned copy; later strokes don't reach it.
    pub snapshot: Raster,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DispatchGate {
    #[default]
    Armed,
    Fired,
}

impl DispatchGate {
    /// Feed one tick's gesture.  Returns a request only on the ARMED → FIRED
    /// edge.
    pub fn observe(&mut self, symbol: GestureSymbol, canvas: &Raster) -> Option<DispatchRequest> {
        match (symbol, *self) {
            (GestureSymbol::Send, DispatchGate::Armed) => {
                *self = DispatchGate::Fired;
                Some(DispatchRequest { snapshot: canvas.clone() })
            }
            (GestureSymbol::Send, DispatchGate::Fired) => None,
            _ => {
                *self = DispatchGate::Armed;
                None
            }
        }
    }

    /// Force back to ARMED (hand lost).
    pub fn rearm(&mut self) {
        *self = DispatchGate::Armed;
    }

    pub fn is_armed(&self) -> bool {
        *self == DispatchGate::Armed
    }
}
