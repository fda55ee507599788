use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Stamp;
use crate::geodesy::{self, LngLat};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Point,
    Line,
    Polygon,
    Rectangle,
    Circle,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Point,
        FeatureKind::Line,
        FeatureKind::Polygon,
        FeatureKind::Rectangle,
        FeatureKind::Circle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Point => "point",
            FeatureKind::Line => "line",
            FeatureKind::Polygon => "polygon",
            FeatureKind::Rectangle => "rectangle",
            FeatureKind::Circle => "circle",
        }
    }

    /// Rectangles and circles export with the polygons.
    pub fn family(&self) -> Family {
        match self {
            FeatureKind::Point => Family::Point,
            FeatureKind::Line => Family::Line,
            FeatureKind::Polygon | FeatureKind::Rectangle | FeatureKind::Circle => Family::Polygon,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Point,
    Line,
    Polygon,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Point, Family::Line, Family::Polygon];

    pub fn file_suffix(&self) -> &'static str {
        match self {
            Family::Point => "points",
            Family::Line => "lines",
            Family::Polygon => "polygons",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point { position: LngLat },
    LineString { path: Vec<LngLat> },
    /// Closed ring, first point repeated last.
    Polygon { ring: Vec<LngLat> },
    Circle { center: LngLat, radius_m: f64 },
}

impl Geometry {
    /// The ordered coordinate sequence; a circle yields its center.
    pub fn coordinates(&self) -> &[LngLat] {
        match self {
            Geometry::Point { position } => std::slice::from_ref(position),
            Geometry::LineString { path } => path,
            Geometry::Polygon { ring } => ring,
            Geometry::Circle { center, .. } => std::slice::from_ref(center),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub length_m: Option<f64>,
    pub area_m2: Option<f64>,
    pub radius_m: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawnFeature {
    pub id: String,
    pub kind: FeatureKind,
    pub geometry: Geometry,
    pub metrics: DerivedMetrics,
    pub attributes: BTreeMap<String, String>,
    pub created_at: Stamp,
}

impl DrawnFeature {
    fn new(
        id: String,
        kind: FeatureKind,
        geometry: Geometry,
        metrics: DerivedMetrics,
        created_at: Stamp,
    ) -> Self {
        DrawnFeature {
            id,
            kind,
            geometry,
            metrics,
            attributes: BTreeMap::new(),
            created_at,
        }
    }

    pub fn point(id: String, position: LngLat, created_at: Stamp) -> Self {
        DrawnFeature::new(
            id,
            FeatureKind::Point,
            Geometry::Point { position },
            DerivedMetrics::default(),
            created_at,
        )
    }

    pub fn line(id: String, path: Vec<LngLat>, created_at: Stamp) -> Self {
        let metrics = DerivedMetrics {
            length_m: Some(geodesy::path_length_meters(&path)),
            ..Default::default()
        };
        DrawnFeature::new(id, FeatureKind::Line, Geometry::LineString { path }, metrics, created_at)
    }

    /// `vertices` is an open ring; it gets closed here.
    pub fn polygon(id: String, vertices: Vec<LngLat>, created_at: Stamp) -> Self {
        DrawnFeature::ring(id, FeatureKind::Polygon, vertices, created_at)
    }

    pub fn rectangle(id: String, corners: [LngLat; 4], created_at: Stamp) -> Self {
        DrawnFeature::ring(id, FeatureKind::Rectangle, corners.to_vec(), created_at)
    }

    fn ring(id: String, kind: FeatureKind, mut ring: Vec<LngLat>, created_at: Stamp) -> Self {
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        let metrics = DerivedMetrics {
            area_m2: Some(geodesy::polygon_area_square_meters(&ring)),
            ..Default::default()
        };
        DrawnFeature::new(id, kind, Geometry::Polygon { ring }, metrics, created_at)
    }

    pub fn circle(id: String, center: LngLat, radius_m: f64, created_at: Stamp) -> Self {
        let radius_m = radius_m.max(0.0);
        let metrics = DerivedMetrics {
            area_m2: Some(geodesy::circle_area_square_meters(radius_m)),
            radius_m: Some(radius_m),
            ..Default::default()
        };
        DrawnFeature::new(
            id,
            FeatureKind::Circle,
            Geometry::Circle { center, radius_m },
            metrics,
            created_at,
        )
    }

    /// Renaming onto an existing key overwrites that key's value.
    pub fn rename_attribute(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.attributes.contains_key(from);
        }
        match self.attributes.remove(from) {
            Some(value) => {
                self.attributes.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }
}
