use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::ImportError;
use crate::feature::{DrawnFeature, Geometry};
use crate::store::FeatureStore;

/// An uploaded GeoJSON file, kept exactly as read.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorLayer {
    pub name: String,
    pub data: Value,
}

impl VectorLayer {
    pub fn feature_count(&self) -> usize {
        match self.data["type"].as_str() {
            Some("FeatureCollection") => self.data["features"].as_array().map_or(0, Vec::len),
            _ => 1,
        }
    }

    pub fn to_geojson(&self) -> String {
        self.data.to_string()
    }

    pub fn file_name(&self) -> String {
        if self.name.ends_with(".geojson") || self.name.ends_with(".json") {
            self.name.clone()
        } else {
            format!("{}.geojson", self.name)
        }
    }
}

/// Parses a `FeatureCollection` or single `Feature`. Anything else aborts
/// the import.
pub fn import_geojson(name: &str, text: &str) -> Result<VectorLayer, ImportError> {
    let data: Value = serde_json::from_str(text)?;
    let object = data.as_object().ok_or(ImportError::NotAnObject)?;
    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            if !object.get("features").is_some_and(Value::is_array) {
                return Err(ImportError::MissingFeatures);
            }
        }
        Some("Feature") => {}
        Some(other) => return Err(ImportError::UnsupportedType(other.to_string())),
        None => return Err(ImportError::MissingType),
    }
    let layer = VectorLayer {
        name: name.to_string(),
        data,
    };
    info!(name, features = layer.feature_count(), "geojson layer imported");
    Ok(layer)
}

fn geometry_json(geometry: &Geometry) -> Value {
    let pair = |p: &crate::geodesy::LngLat| json!([p.lng, p.lat]);
    match geometry {
        Geometry::Point { position } => json!({"type": "Point", "coordinates": pair(position)}),
        Geometry::LineString { path } => json!({
            "type": "LineString",
            "coordinates": path.iter().map(pair).collect::<Vec<_>>(),
        }),
        Geometry::Polygon { ring } => json!({
            "type": "Polygon",
            "coordinates": [ring.iter().map(pair).collect::<Vec<_>>()],
        }),
        Geometry::Circle { center, .. } => json!({"type": "Point", "coordinates": pair(center)}),
    }
}

fn feature_json(feature: &DrawnFeature) -> Value {
    let mut properties = Map::new();
    for (key, value) in &feature.attributes {
        properties.insert(key.clone(), Value::String(value.clone()));
    }
    properties.insert("id".into(), json!(feature.id));
    properties.insert("feature_type".into(), json!(feature.kind.as_str()));
    properties.insert("created_at".into(), json!(feature.created_at.display()));
    properties.insert("created_ms".into(), json!(feature.created_at.epoch_ms));
    if let Some(length) = feature.metrics.length_m {
        properties.insert("length_m".into(), json!(length));
    }
    if let Some(area) = feature.metrics.area_m2 {
        properties.insert("area_m2".into(), json!(area));
    }
    if let Some(radius) = feature.metrics.radius_m {
        properties.insert("radius_m".into(), json!(radius));
    }
    json!({
        "type": "Feature",
        "id": feature.id,
        "geometry": geometry_json(&feature.geometry),
        "properties": properties,
    })
}

/// Drawn features as a `FeatureCollection`. Circles become points with a
/// `radius_m` property.
pub fn features_to_geojson(store: &FeatureStore) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": store.iter().map(feature_json).collect::<Vec<_>>(),
    })
}
