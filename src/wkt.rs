use crate::feature::Geometry;
use crate::geodesy::LngLat;

/// Well-Known Text for a feature geometry.
///
/// Circles have no WKT primitive; they are written as their center with
/// a `BUFFER <radius>` suffix.
pub fn format_coordinates(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point { position } => format!("POINT({})", pair(position)),
        Geometry::LineString { path } => format!("LINESTRING({})", sequence(path)),
        Geometry::Polygon { ring } => format!("POLYGON(({}))", sequence(ring)),
        Geometry::Circle { center, radius_m } => {
            format!("POINT({}) BUFFER {:.2}", pair(center), radius_m)
        }
    }
}

fn pair(p: &LngLat) -> String {
    format!("{} {}", p.lng, p.lat)
}

fn sequence(points: &[LngLat]) -> String {
    points.iter().map(pair).collect::<Vec<_>>().join(", ")
}
