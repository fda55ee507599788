//! Drawing gestures: one state machine per tool, one tool active at a time.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{new_feature_id, Clock, Stamp};
use crate::config::HitTolerance;
use crate::feature::DrawnFeature;
use crate::geodesy::{self, LngLat};
use crate::hit_test;
use crate::input::{MapEvent, Preview};
use crate::store::FeatureStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    Marker,
    Polyline,
    Polygon,
    Rectangle,
    Circle,
    Erase,
}

impl DrawMode {
    /// Polylines count clicks; polygons need distinct positions.
    fn enough_vertices(&self, points: &[LngLat]) -> bool {
        match self {
            DrawMode::Polygon => distinct_count(points) >= 3,
            _ => points.len() >= 2,
        }
    }
}

fn distinct_count(points: &[LngLat]) -> usize {
    points
        .iter()
        .enumerate()
        .filter(|&(i, p)| !points[..i].contains(p))
        .count()
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    Collecting { points: Vec<LngLat> },
    Rectangle { first: LngLat, second: Option<LngLat> },
    Circle { center: LngLat, radius_m: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// The event meant nothing in the current state.
    Ignored,
    /// In-progress state or preview changed.
    Updated,
    Added(String),
    Erased(String),
    Missed(LngLat),
    Cancelled,
}

pub struct DrawingEngine {
    mode: DrawMode,
    gesture: Gesture,
    pointer: Option<LngLat>,
    tolerance: HitTolerance,
    offset_hours: i32,
}

impl DrawingEngine {
    pub fn new(mode: DrawMode, tolerance: HitTolerance, offset_hours: i32) -> DrawingEngine {
        DrawingEngine {
            mode,
            gesture: Gesture::Idle,
            pointer: None,
            tolerance,
            offset_hours,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Switching tools drops whatever was in progress.
    pub fn set_mode(&mut self, mode: DrawMode) {
        debug!(?mode, "draw mode selected");
        self.mode = mode;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.pointer = None;
    }

    pub fn set_tolerance(&mut self, tolerance: HitTolerance) {
        self.tolerance = tolerance;
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// 0, 1 or 2 corners placed; `None` outside rectangle mode.
    pub fn rectangle_step(&self) -> Option<usize> {
        if self.mode != DrawMode::Rectangle {
            return None;
        }
        Some(match self.gesture {
            Gesture::Rectangle { second: None, .. } => 1,
            Gesture::Rectangle { second: Some(_), .. } => 2,
            _ => 0,
        })
    }

    pub fn handle(
        &mut self,
        event: MapEvent,
        store: &mut FeatureStore,
        clock: &dyn Clock,
    ) -> GestureOutcome {
        if event == MapEvent::Escape {
            return self.cancel();
        }
        match self.mode {
            DrawMode::Marker => match event {
                MapEvent::Click(at) => {
                    let stamp = self.stamp(clock);
                    let id = unique_id(store, stamp.epoch_ms);
                    self.finalize(store, DrawnFeature::point(id, at, stamp))
                }
                _ => GestureOutcome::Ignored,
            },
            DrawMode::Polyline | DrawMode::Polygon => self.handle_vertices(event, store, clock),
            DrawMode::Rectangle => self.handle_rectangle(event, store, clock),
            DrawMode::Circle => self.handle_circle(event, store, clock),
            DrawMode::Erase => match event {
                MapEvent::Click(at) => self.erase(at, store),
                _ => GestureOutcome::Ignored,
            },
        }
    }

    fn cancel(&mut self) -> GestureOutcome {
        let was_busy = !self.is_idle();
        self.reset();
        if was_busy {
            debug!(mode = ?self.mode, "gesture cancelled");
            GestureOutcome::Cancelled
        } else {
            GestureOutcome::Ignored
        }
    }

    fn handle_vertices(
        &mut self,
        event: MapEvent,
        store: &mut FeatureStore,
        clock: &dyn Clock,
    ) -> GestureOutcome {
        match (event, &mut self.gesture) {
            (MapEvent::Click(at), Gesture::Idle) => {
                self.gesture = Gesture::Collecting { points: vec![at] };
                GestureOutcome::Updated
            }
            (MapEvent::Click(at), Gesture::Collecting { points }) => {
                points.push(at);
                GestureOutcome::Updated
            }
            (MapEvent::PointerMove(at), _) => {
                self.pointer = Some(at);
                if self.is_idle() {
                    GestureOutcome::Ignored
                } else {
                    GestureOutcome::Updated
                }
            }
            (MapEvent::DoubleClick(_), Gesture::Collecting { points }) => {
                if !self.mode.enough_vertices(points) {
                    debug!(count = points.len(), "not enough vertices to finish");
                    return GestureOutcome::Ignored;
                }
                let points = std::mem::take(points);
                self.reset();
                let stamp = self.stamp(clock);
                let id = unique_id(store, stamp.epoch_ms);
                let feature = match self.mode {
                    DrawMode::Polygon => DrawnFeature::polygon(id, points, stamp),
                    _ => DrawnFeature::line(id, points, stamp),
                };
                self.finalize(store, feature)
            }
            _ => GestureOutcome::Ignored,
        }
    }

    fn handle_rectangle(
        &mut self,
        event: MapEvent,
        store: &mut FeatureStore,
        clock: &dyn Clock,
    ) -> GestureOutcome {
        match (event, self.gesture.clone()) {
            (MapEvent::Click(at), Gesture::Idle) => {
                self.gesture = Gesture::Rectangle {
                    first: at,
                    second: None,
                };
                GestureOutcome::Updated
            }
            (MapEvent::Click(at), Gesture::Rectangle { first, second: None }) => {
                if at == first {
                    return GestureOutcome::Ignored;
                }
                self.gesture = Gesture::Rectangle {
                    first,
                    second: Some(at),
                };
                GestureOutcome::Updated
            }
            (MapEvent::Click(at), Gesture::Rectangle { first, second: Some(second) }) => {
                let Some(corners) = rectangle_corners(first, second, at) else {
                    debug!("third rectangle point is on the first edge");
                    return GestureOutcome::Ignored;
                };
                // Stays in rectangle mode, back at step 0.
                self.reset();
                let stamp = self.stamp(clock);
                let id = unique_id(store, stamp.epoch_ms);
                self.finalize(store, DrawnFeature::rectangle(id, corners, stamp))
            }
            (MapEvent::PointerMove(at), gesture) => {
                self.pointer = Some(at);
                if gesture == Gesture::Idle {
                    GestureOutcome::Ignored
                } else {
                    GestureOutcome::Updated
                }
            }
            _ => GestureOutcome::Ignored,
        }
    }

    fn handle_circle(
        &mut self,
        event: MapEvent,
        store: &mut FeatureStore,
        clock: &dyn Clock,
    ) -> GestureOutcome {
        match (event, &mut self.gesture) {
            (MapEvent::PointerDown(at), Gesture::Idle) => {
                self.gesture = Gesture::Circle {
                    center: at,
                    radius_m: 0.0,
                };
                GestureOutcome::Updated
            }
            (MapEvent::PointerMove(at), Gesture::Circle { center, radius_m }) => {
                *radius_m = geodesy::distance_meters(*center, at);
                self.pointer = Some(at);
                GestureOutcome::Updated
            }
            (MapEvent::PointerUp(_), Gesture::Circle { center, radius_m }) => {
                let (center, radius_m) = (*center, *radius_m);
                self.reset();
                let stamp = self.stamp(clock);
                let id = unique_id(store, stamp.epoch_ms);
                self.finalize(store, DrawnFeature::circle(id, center, radius_m, stamp))
            }
            (MapEvent::PointerMove(at), _) => {
                self.pointer = Some(at);
                GestureOutcome::Ignored
            }
            _ => GestureOutcome::Ignored,
        }
    }

    fn erase(&mut self, at: LngLat, store: &mut FeatureStore) -> GestureOutcome {
        let hit = hit_test::find_hit(store.features(), at, &self.tolerance).map(|f| f.id.clone());
        match hit {
            Some(id) => {
                store.remove_by_id(&id);
                GestureOutcome::Erased(id)
            }
            None => {
                debug!(lng = at.lng, lat = at.lat, "erase missed");
                GestureOutcome::Missed(at)
            }
        }
    }

    fn finalize(&self, store: &mut FeatureStore, feature: DrawnFeature) -> GestureOutcome {
        let id = feature.id.clone();
        store.append(feature);
        GestureOutcome::Added(id)
    }

    fn stamp(&self, clock: &dyn Clock) -> Stamp {
        Stamp::at(clock.now_ms(), self.offset_hours)
    }

    /// Temporary visuals for the gesture in progress, empty when idle.
    pub fn preview(&self) -> Vec<Preview> {
        match &self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Collecting { points } => {
                let mut shape = points.clone();
                shape.extend(self.pointer);
                let outline = if self.mode == DrawMode::Polygon && shape.len() >= 3 {
                    shape.push(shape[0]);
                    Preview::Ring {
                        points: shape,
                        label: None,
                    }
                } else {
                    Preview::Path {
                        points: shape,
                        label: None,
                    }
                };
                vec![
                    Preview::Markers {
                        points: points.clone(),
                    },
                    outline,
                ]
            }
            Gesture::Rectangle { first, second } => {
                let mut out = vec![Preview::Markers {
                    points: std::iter::once(*first).chain(*second).collect(),
                }];
                match (second, self.pointer) {
                    (None, Some(pointer)) => out.push(Preview::Path {
                        points: vec![*first, pointer],
                        label: None,
                    }),
                    (Some(second), pointer) => {
                        let live = pointer.and_then(|p| rectangle_corners(*first, *second, p));
                        out.push(match live {
                            Some(corners) => Preview::Ring {
                                points: close_ring(&corners),
                                label: None,
                            },
                            None => Preview::Path {
                                points: vec![*first, *second],
                                label: None,
                            },
                        });
                    }
                    (None, None) => {}
                }
                out
            }
            Gesture::Circle { center, radius_m } => vec![
                Preview::Markers {
                    points: vec![*center],
                },
                Preview::Circle {
                    center: *center,
                    radius_m: *radius_m,
                },
            ],
        }
    }
}

/// Corners of the rectangle built on edge `first`-`second` and extended
/// to the depth of `third`, in lng/lat plane coordinates.
///
/// Returns `None` when the edge is empty or `third` lies on its line.
pub fn rectangle_corners(first: LngLat, second: LngLat, third: LngLat) -> Option<[LngLat; 4]> {
    let (ex, ey) = (second.lng - first.lng, second.lat - first.lat);
    let edge_len2 = ex * ex + ey * ey;
    if edge_len2 == 0.0 {
        return None;
    }
    let t = ((third.lng - first.lng) * ex + (third.lat - first.lat) * ey) / edge_len2;
    let projection = LngLat::new(first.lng + t * ex, first.lat + t * ey);
    let (px, py) = (third.lng - projection.lng, third.lat - projection.lat);
    if px == 0.0 && py == 0.0 {
        return None;
    }
    Some([
        first,
        second,
        LngLat::new(second.lng + px, second.lat + py),
        LngLat::new(first.lng + px, first.lat + py),
    ])
}

fn close_ring(corners: &[LngLat; 4]) -> Vec<LngLat> {
    let mut ring = corners.to_vec();
    ring.push(corners[0]);
    ring
}

fn unique_id(store: &FeatureStore, epoch_ms: i64) -> String {
    loop {
        let id = new_feature_id(epoch_ms);
        if !store.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::feature::{FeatureKind, Geometry};

    const CLOCK: FixedClock = FixedClock(1_700_000_000_000);

    fn engine(mode: DrawMode) -> DrawingEngine {
        DrawingEngine::new(mode, HitTolerance::default(), 7)
    }

    fn p(lng: f64, lat: f64) -> LngLat {
        LngLat::new(lng, lat)
    }

    fn run(
        engine: &mut DrawingEngine,
        store: &mut FeatureStore,
        events: &[MapEvent],
    ) -> Vec<GestureOutcome> {
        events
            .iter()
            .map(|ev| engine.handle(*ev, store, &CLOCK))
            .collect()
    }

    #[test]
    fn marker_stays_active() {
        let mut e = engine(DrawMode::Marker);
        let mut store = FeatureStore::new();
        run(
            &mut e,
            &mut store,
            &[MapEvent::Click(p(100.523, 13.736)), MapEvent::Click(p(100.6, 13.8))],
        );
        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|f| f.kind == FeatureKind::Point));
        assert_eq!(e.mode(), DrawMode::Marker);
    }

    #[test]
    fn polyline_finishes_on_double_click() {
        let mut e = engine(DrawMode::Polyline);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.0, 0.01)),
                MapEvent::PointerMove(p(0.0, 0.02)),
                MapEvent::Click(p(0.0, 0.02)),
                MapEvent::DoubleClick(p(0.0, 0.02)),
            ],
        );
        assert!(matches!(out.last(), Some(GestureOutcome::Added(_))));
        let f = &store.features()[0];
        assert_eq!(f.kind, FeatureKind::Line);
        assert_eq!(f.geometry.coordinates().len(), 3);
        assert!(f.metrics.length_m.unwrap() > 2_000.0);
        assert!(e.is_idle());
        assert!(e.preview().is_empty());
    }

    #[test]
    fn polyline_underflow_is_silent() {
        let mut e = engine(DrawMode::Polyline);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[MapEvent::Click(p(0.0, 0.0)), MapEvent::DoubleClick(p(0.0, 0.0))],
        );
        assert_eq!(out[1], GestureOutcome::Ignored);
        assert!(store.is_empty());
        assert!(!e.is_idle());
    }

    #[test]
    fn polyline_same_point_twice_finishes_with_zero_length() {
        let mut e = engine(DrawMode::Polyline);
        let mut store = FeatureStore::new();
        run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::DoubleClick(p(0.0, 0.0)),
            ],
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.features()[0].metrics.length_m, Some(0.0));
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let mut e = engine(DrawMode::Polygon);
        let mut store = FeatureStore::new();
        run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.01, 0.0)),
                MapEvent::DoubleClick(p(0.01, 0.0)),
            ],
        );
        assert!(store.is_empty());

        run(
            &mut e,
            &mut store,
            &[MapEvent::Click(p(0.01, 0.01)), MapEvent::DoubleClick(p(0.01, 0.01))],
        );
        assert_eq!(store.len(), 1);
        let ring = store.features()[0].geometry.coordinates();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
    }

    #[test]
    fn polygon_preview_is_closed_ring() {
        let mut e = engine(DrawMode::Polygon);
        let mut store = FeatureStore::new();
        run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.01, 0.0)),
                MapEvent::PointerMove(p(0.01, 0.01)),
            ],
        );
        let preview = e.preview();
        match &preview[1] {
            Preview::Ring { points, .. } => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[0], points[3]);
            }
            other => panic!("expected ring, got {:?}", other),
        }
    }

    #[test]
    fn escape_discards_but_keeps_mode() {
        let mut e = engine(DrawMode::Polygon);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.01, 0.0)),
                MapEvent::Escape,
            ],
        );
        assert_eq!(out[2], GestureOutcome::Cancelled);
        assert!(e.is_idle());
        assert_eq!(e.mode(), DrawMode::Polygon);
        assert!(store.is_empty());
        assert_eq!(e.handle(MapEvent::Escape, &mut store, &CLOCK), GestureOutcome::Ignored);
    }

    #[test]
    fn polygon_needs_three_distinct_vertices() {
        let mut e = engine(DrawMode::Polygon);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(1.0, 1.0)),
                MapEvent::Click(p(1.0, 1.0)),
                MapEvent::Click(p(1.0, 1.0)),
                MapEvent::DoubleClick(p(1.0, 1.0)),
            ],
        );
        assert_eq!(out[3], GestureOutcome::Ignored);
        assert!(store.is_empty());
        assert!(!e.is_idle());

        // two distinct so far; a third distinct position completes it
        run(
            &mut e,
            &mut store,
            &[MapEvent::Click(p(1.01, 1.0)), MapEvent::DoubleClick(p(1.01, 1.0))],
        );
        assert!(store.is_empty());
        run(
            &mut e,
            &mut store,
            &[MapEvent::Click(p(1.01, 1.01)), MapEvent::DoubleClick(p(1.01, 1.01))],
        );
        assert_eq!(store.len(), 1);
        assert!(store.features()[0].metrics.area_m2.unwrap() > 0.0);
    }

    #[test]
    fn escape_mid_rectangle_returns_to_step_zero() {
        let mut e = engine(DrawMode::Rectangle);
        let mut store = FeatureStore::new();

        run(&mut e, &mut store, &[MapEvent::Click(p(0.0, 0.0))]);
        assert_eq!(e.rectangle_step(), Some(1));
        assert_eq!(e.handle(MapEvent::Escape, &mut store, &CLOCK), GestureOutcome::Cancelled);
        assert_eq!(e.rectangle_step(), Some(0));

        run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.0, 0.001)),
                MapEvent::PointerMove(p(0.001, 0.001)),
            ],
        );
        assert_eq!(e.rectangle_step(), Some(2));
        assert_eq!(e.handle(MapEvent::Escape, &mut store, &CLOCK), GestureOutcome::Cancelled);
        assert_eq!(e.rectangle_step(), Some(0));
        assert!(e.preview().is_empty());
        assert_eq!(e.mode(), DrawMode::Rectangle);

        // the next click starts a new rectangle rather than finishing the old one
        let out = e.handle(MapEvent::Click(p(0.001, 0.001)), &mut store, &CLOCK);
        assert_eq!(out, GestureOutcome::Updated);
        assert_eq!(e.rectangle_step(), Some(1));
        assert!(store.is_empty());
    }

    #[test]
    fn escape_mid_circle_drag_emits_nothing() {
        let mut e = engine(DrawMode::Circle);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[
                MapEvent::PointerDown(p(0.0, 0.0)),
                MapEvent::PointerMove(p(0.0, 0.001)),
                MapEvent::Escape,
                MapEvent::PointerUp(p(0.0, 0.001)),
            ],
        );
        assert_eq!(out[2], GestureOutcome::Cancelled);
        assert_eq!(out[3], GestureOutcome::Ignored);
        assert!(store.is_empty());
        assert!(e.is_idle());
        assert!(e.preview().is_empty());
        assert_eq!(e.mode(), DrawMode::Circle);
    }

    #[test]
    fn mode_switch_resets() {
        let mut e = engine(DrawMode::Polyline);
        let mut store = FeatureStore::new();
        run(&mut e, &mut store, &[MapEvent::Click(p(0.0, 0.0))]);
        e.set_mode(DrawMode::Polygon);
        assert!(e.is_idle());
        e.set_mode(DrawMode::Rectangle);
        assert_eq!(e.rectangle_step(), Some(0));
    }

    #[test]
    fn rectangle_corner_math() {
        let corners = rectangle_corners(p(0.0, 0.0), p(0.0, 0.001), p(0.001, 0.001)).unwrap();
        assert_eq!(corners[0], p(0.0, 0.0));
        assert_eq!(corners[1], p(0.0, 0.001));
        assert_eq!(corners[2], p(0.001, 0.001));
        assert_eq!(corners[3], p(0.001, 0.0));

        // third point past the edge end still projects onto the edge line
        let skew = rectangle_corners(p(0.0, 0.0), p(0.002, 0.0), p(0.005, 0.001)).unwrap();
        assert!((skew[3].lng - 0.0).abs() < 1e-12);
        assert!((skew[3].lat - 0.001).abs() < 1e-12);

        assert!(rectangle_corners(p(0.0, 0.0), p(0.0, 0.0), p(1.0, 1.0)).is_none());
        assert!(rectangle_corners(p(0.0, 0.0), p(0.0, 0.001), p(0.0, 0.005)).is_none());
    }

    #[test]
    fn rectangle_three_clicks() {
        let mut e = engine(DrawMode::Rectangle);
        let mut store = FeatureStore::new();
        run(&mut e, &mut store, &[MapEvent::Click(p(0.0, 0.0))]);
        assert_eq!(e.rectangle_step(), Some(1));
        run(&mut e, &mut store, &[MapEvent::Click(p(0.0, 0.001))]);
        assert_eq!(e.rectangle_step(), Some(2));

        run(&mut e, &mut store, &[MapEvent::PointerMove(p(0.0005, 0.0008))]);
        match e.preview().last() {
            Some(Preview::Ring { points, .. }) => {
                assert_eq!(points.len(), 5);
                assert!((points[3].lng - 0.0005).abs() < 1e-12);
                assert!(points[3].lat.abs() < 1e-12);
            }
            other => panic!("expected live ring, got {:?}", other),
        }

        let out = e.handle(MapEvent::Click(p(0.001, 0.001)), &mut store, &CLOCK);
        assert!(matches!(out, GestureOutcome::Added(_)));
        assert_eq!(e.rectangle_step(), Some(0));
        assert_eq!(e.mode(), DrawMode::Rectangle);

        let f = &store.features()[0];
        assert_eq!(f.kind, FeatureKind::Rectangle);
        assert_eq!(
            f.geometry.coordinates(),
            &[
                p(0.0, 0.0),
                p(0.0, 0.001),
                p(0.001, 0.001),
                p(0.001, 0.0),
                p(0.0, 0.0)
            ]
        );
        assert!(f.metrics.area_m2.unwrap() > 0.0);
    }

    #[test]
    fn rectangle_collinear_third_click_ignored() {
        let mut e = engine(DrawMode::Rectangle);
        let mut store = FeatureStore::new();
        let out = run(
            &mut e,
            &mut store,
            &[
                MapEvent::Click(p(0.0, 0.0)),
                MapEvent::Click(p(0.0, 0.001)),
                MapEvent::Click(p(0.0, 0.003)),
            ],
        );
        assert_eq!(out[2], GestureOutcome::Ignored);
        assert_eq!(e.rectangle_step(), Some(2));
        assert!(store.is_empty());
    }

    #[test]
    fn circle_press_drag_release() {
        let mut e = engine(DrawMode::Circle);
        let mut store = FeatureStore::new();
        run(
            &mut e,
            &mut store,
            &[
                MapEvent::PointerDown(p(0.0, 0.0)),
                MapEvent::PointerMove(p(0.0, 0.001)),
            ],
        );
        match e.preview().last() {
            Some(Preview::Circle { radius_m, .. }) => assert!((radius_m - 111.32).abs() < 0.01),
            other => panic!("expected circle, got {:?}", other),
        }
        run(&mut e, &mut store, &[MapEvent::PointerUp(p(0.0, 0.001))]);

        let f = &store.features()[0];
        assert_eq!(f.kind, FeatureKind::Circle);
        match f.geometry {
            Geometry::Circle { center, radius_m } => {
                assert_eq!(center, p(0.0, 0.0));
                assert!((radius_m - 111.32).abs() < 0.01);
            }
            _ => panic!("expected circle geometry"),
        }
        assert!(e.is_idle());
    }

    #[test]
    fn erase_hit_and_miss() {
        let mut store = FeatureStore::new();
        let mut marker = engine(DrawMode::Marker);
        run(&mut marker, &mut store, &[MapEvent::Click(p(100.5, 13.7))]);
        let id = store.features()[0].id.clone();

        let mut e = engine(DrawMode::Erase);
        let miss = e.handle(MapEvent::Click(p(101.0, 14.0)), &mut store, &CLOCK);
        assert_eq!(miss, GestureOutcome::Missed(p(101.0, 14.0)));
        assert_eq!(store.len(), 1);
        assert!(store.discarded().is_empty());

        let hit = e.handle(MapEvent::Click(p(100.5, 13.7)), &mut store, &CLOCK);
        assert_eq!(hit, GestureOutcome::Erased(id.clone()));
        assert!(store.is_empty());
        assert_eq!(store.discarded()[0].id, id);
    }

    #[test]
    fn ids_are_unique_within_a_millisecond() {
        let mut e = engine(DrawMode::Marker);
        let mut store = FeatureStore::new();
        for i in 0..50 {
            e.handle(MapEvent::Click(p(i as f64 * 0.001, 0.0)), &mut store, &CLOCK);
        }
        let mut ids: Vec<&str> = store.iter().map(|f| f.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }
}
