//! Throwaway distance/area measuring. Results are reported, never stored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geodesy::{self, LngLat};
use crate::input::{MapEvent, Preview};
use crate::units::{self, Unit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    Distance,
    Area,
}

impl MeasureKind {
    fn min_vertices(&self) -> usize {
        match self {
            MeasureKind::Distance => 2,
            MeasureKind::Area => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub kind: MeasureKind,
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    fn from_points(kind: MeasureKind, points: &[LngLat]) -> Measurement {
        let quantity = match kind {
            MeasureKind::Distance => units::format_distance(geodesy::path_length_meters(points)),
            MeasureKind::Area => units::format_area(geodesy::polygon_area_square_meters(points)),
        };
        Measurement {
            kind,
            value: quantity.value,
            unit: quantity.unit,
        }
    }

    pub fn label(&self) -> String {
        format!("{:.2} {}", self.value, self.unit)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeasureOutcome {
    Ignored,
    Updated,
    Completed(Measurement),
    Cancelled,
}

pub struct MeasurementOverlay {
    kind: MeasureKind,
    drawing: bool,
    points: Vec<LngLat>,
    pointer: Option<LngLat>,
}

impl MeasurementOverlay {
    pub fn new(kind: MeasureKind) -> MeasurementOverlay {
        MeasurementOverlay {
            kind,
            drawing: false,
            points: Vec::new(),
            pointer: None,
        }
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn clear(&mut self) {
        self.drawing = false;
        self.points.clear();
        self.pointer = None;
    }

    pub fn handle(&mut self, event: MapEvent) -> MeasureOutcome {
        match event {
            MapEvent::Click(at) => {
                self.drawing = true;
                self.points.push(at);
                MeasureOutcome::Updated
            }
            MapEvent::PointerMove(at) => {
                self.pointer = Some(at);
                if self.drawing {
                    MeasureOutcome::Updated
                } else {
                    MeasureOutcome::Ignored
                }
            }
            MapEvent::DoubleClick(_) if self.drawing => {
                if self.points.len() < self.kind.min_vertices() {
                    return MeasureOutcome::Ignored;
                }
                let result = Measurement::from_points(self.kind, &self.points);
                debug!(kind = ?self.kind, label = %result.label(), "measurement completed");
                self.clear();
                MeasureOutcome::Completed(result)
            }
            MapEvent::Escape if self.drawing => {
                self.clear();
                MeasureOutcome::Cancelled
            }
            _ => MeasureOutcome::Ignored,
        }
    }

    /// Placed vertices plus the live shape to the pointer, with its label.
    pub fn preview(&self) -> Vec<Preview> {
        if !self.drawing {
            return Vec::new();
        }
        let mut shape = self.points.clone();
        shape.extend(self.pointer);
        let markers = Preview::Markers {
            points: self.points.clone(),
        };
        let outline = match self.kind {
            MeasureKind::Distance => {
                let label = (shape.len() >= 2)
                    .then(|| Measurement::from_points(MeasureKind::Distance, &shape).label());
                Preview::Path {
                    points: shape,
                    label,
                }
            }
            MeasureKind::Area if shape.len() >= 3 => {
                let label = Some(Measurement::from_points(MeasureKind::Area, &shape).label());
                shape.push(shape[0]);
                Preview::Ring {
                    points: shape,
                    label,
                }
            }
            MeasureKind::Area => Preview::Path {
                points: shape,
                label: None,
            },
        };
        vec![markers, outline]
    }
}
