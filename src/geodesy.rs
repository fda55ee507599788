//! Great-circle distance and spherical polygon area on a WGS84-radius sphere.
//!
//! Areas come from `geo`'s Chamberlain-Duquette implementation, which uses
//! the same equatorial radius as [`distance_meters`].

use geo::{ChamberlainDuquetteArea, Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Equatorial WGS84 radius, the sphere web map libraries measure on.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geographic position. Serialises as `[lng, lat]`, GeoJSON order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> LngLat {
        LngLat { lng, lat }
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        LngLat { lng, lat }
    }
}

impl From<LngLat> for (f64, f64) {
    fn from(p: LngLat) -> Self {
        (p.lng, p.lat)
    }
}

impl From<LngLat> for Coord<f64> {
    fn from(p: LngLat) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

impl From<LngLat> for Point<f64> {
    fn from(p: LngLat) -> Self {
        Point::new(p.lng, p.lat)
    }
}

/// Haversine distance in meters.
pub fn distance_meters(a: LngLat, b: LngLat) -> f64 {
    let lat0 = a.lat.to_radians();
    let lat1 = b.lat.to_radians();
    let sin_dlat = ((b.lat - a.lat).to_radians() / 2.0).sin();
    let sin_dlng = ((b.lng - a.lng).to_radians() / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat0.cos() * lat1.cos() * sin_dlng * sin_dlng;
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

pub fn path_length_meters(points: &[LngLat]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum()
}

/// Spherical-excess approximation of a ring's area in square meters.
///
/// The ring may be open or closed; a repeated closing vertex contributes
/// nothing. Only accurate for areas that are small next to the Earth.
pub fn polygon_area_square_meters(points: &[LngLat]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let exterior: LineString<f64> = points.iter().map(|p| Coord::from(*p)).collect();
    Polygon::new(exterior, vec![]).chamberlain_duquette_unsigned_area()
}

pub fn circle_area_square_meters(radius_m: f64) -> f64 {
    std::f64::consts::PI * radius_m * radius_m
}

/// Equirectangular projection of `p` into meters around `origin`.
///
/// Good enough for the few-pixel distances hit-testing deals with.
pub fn local_meters(origin: LngLat, p: LngLat) -> (f64, f64) {
    let x = (p.lng - origin.lng).to_radians() * EARTH_RADIUS_M * origin.lat.to_radians().cos();
    let y = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    (x, y)
}

/// Shortest distance in meters from `p` to the segment `a`-`b`.
pub fn segment_distance_meters(p: LngLat, a: LngLat, b: LngLat) -> f64 {
    let (ax, ay) = local_meters(p, a);
    let (bx, by) = local_meters(p, b);
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (-(ax * dx + ay * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (cx * cx + cy * cy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn distance_symmetric_and_zero() {
        let a = LngLat::new(100.523, 13.736);
        let b = LngLat::new(100.601, 13.802);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
        assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_meters(LngLat::new(0.0, 0.0), LngLat::new(0.0, 1.0));
        // R * pi / 180
        assert!(approx(d, 111_319.49, 0.01), "{}", d);
    }

    #[test]
    fn path_length_sums_segments() {
        assert_eq!(path_length_meters(&[]), 0.0);
        assert_eq!(path_length_meters(&[LngLat::new(1.0, 1.0)]), 0.0);

        let pts = [
            LngLat::new(0.0, 0.0),
            LngLat::new(0.0, 1.0),
            LngLat::new(0.0, 2.0),
        ];
        let expected = distance_meters(pts[0], pts[1]) + distance_meters(pts[1], pts[2]);
        assert!(approx(path_length_meters(&pts), expected, 1e-6));
    }

    #[test]
    fn area_matches_spherical_excess_sum() {
        let ring = [
            LngLat::new(100.50, 13.70),
            LngLat::new(100.52, 13.70),
            LngLat::new(100.53, 13.72),
            LngLat::new(100.51, 13.73),
        ];
        let mut sum = 0.0;
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
            sum += (b.lng - a.lng).to_radians()
                * (2.0 + a.lat.to_radians().sin() + b.lat.to_radians().sin());
        }
        let expected = (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs();
        let area = polygon_area_square_meters(&ring);
        assert!(approx(area, expected, expected * 1e-9), "{} vs {}", area, expected);
    }

    #[test]
    fn area_degenerate() {
        assert_eq!(polygon_area_square_meters(&[]), 0.0);
        assert_eq!(
            polygon_area_square_meters(&[LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn area_rotation_and_winding_invariant() {
        let ring = vec![
            LngLat::new(100.50, 13.70),
            LngLat::new(100.52, 13.70),
            LngLat::new(100.53, 13.72),
            LngLat::new(100.51, 13.73),
        ];
        let base = polygon_area_square_meters(&ring);
        assert!(base > 0.0);

        for shift in 1..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            assert!(approx(polygon_area_square_meters(&rotated), base, base * 1e-9));
        }

        let mut reversed = ring.clone();
        reversed.reverse();
        assert!(approx(polygon_area_square_meters(&reversed), base, base * 1e-9));
    }

    #[test]
    fn closed_ring_same_as_open() {
        let open = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(0.01, 0.0),
            LngLat::new(0.01, 0.01),
        ];
        let mut closed = open.clone();
        closed.push(open[0]);
        let area = polygon_area_square_meters(&open);
        assert!(approx(polygon_area_square_meters(&closed), area, area * 1e-9));
    }

    #[test]
    fn small_square_near_equator() {
        // ~1113 m x ~1113 m
        let ring = [
            LngLat::new(0.0, 0.0),
            LngLat::new(0.01, 0.0),
            LngLat::new(0.01, 0.01),
            LngLat::new(0.0, 0.01),
        ];
        let side = distance_meters(ring[0], ring[1]);
        let area = polygon_area_square_meters(&ring);
        assert!(approx(area, side * side, side * side * 0.001), "{}", area);
    }

    #[test]
    fn segment_distance() {
        let a = LngLat::new(0.0, 0.0);
        let b = LngLat::new(0.0, 0.01);
        let mid_off = LngLat::new(0.0001, 0.005);
        let d = segment_distance_meters(mid_off, a, b);
        assert!(approx(d, 11.13, 0.05), "{}", d);

        // beyond the end clamps to the endpoint
        let past = LngLat::new(0.0, 0.02);
        assert!(approx(
            segment_distance_meters(past, a, b),
            distance_meters(past, b),
            1.0
        ));
    }

    #[test]
    fn serde_as_pair() {
        let p = LngLat::new(100.523, 13.736);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[100.523,13.736]");
        let back: LngLat = serde_json::from_str("[1.5,2.5]").unwrap();
        assert_eq!(back, LngLat::new(1.5, 2.5));
    }
}
