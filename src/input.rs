use serde::{Deserialize, Serialize};

use crate::geodesy::LngLat;

/// A pointer or keyboard event, already projected to map coordinates.
///
/// A browser double-click also delivers two `Click`s first; `DoubleClick`
/// itself never adds a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "at", rename_all = "snake_case")]
pub enum MapEvent {
    Click(LngLat),
    DoubleClick(LngLat),
    PointerDown(LngLat),
    PointerMove(LngLat),
    PointerUp(LngLat),
    Escape,
}

impl MapEvent {
    pub fn position(&self) -> Option<LngLat> {
        match *self {
            MapEvent::Click(p)
            | MapEvent::DoubleClick(p)
            | MapEvent::PointerDown(p)
            | MapEvent::PointerMove(p)
            | MapEvent::PointerUp(p) => Some(p),
            MapEvent::Escape => None,
        }
    }
}

/// Temporary visuals for an in-progress gesture. Rendering is up to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Preview {
    Markers { points: Vec<LngLat> },
    Path { points: Vec<LngLat>, label: Option<String> },
    Ring { points: Vec<LngLat>, label: Option<String> },
    Circle { center: LngLat, radius_m: f64 },
}
