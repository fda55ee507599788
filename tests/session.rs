use std::collections::BTreeMap;
use std::fs;

use fieldmap::{
    replay, AppEvent, Config, DrawMode, FeatureKind, FieldMap, FixedClock, LngLat, MapEvent,
    MeasureKind, Tool,
};
use tempfile::tempdir;

const TS: i64 = 1_709_314_205_000;

fn p(lng: f64, lat: f64) -> LngLat {
    LngLat::new(lng, lat)
}

fn app() -> FieldMap {
    FieldMap::with_clock(Config::default(), Box::new(FixedClock(TS)))
}

#[test]
fn survey_session_exports_per_family() {
    let mut app = app();

    app.select_tool(Tool::Draw(DrawMode::Marker));
    app.handle(MapEvent::Click(p(100.5, 13.7)));

    app.select_tool(Tool::Draw(DrawMode::Polyline));
    for at in [p(100.5, 13.7), p(100.501, 13.7)] {
        app.handle(MapEvent::Click(at));
    }
    app.handle(MapEvent::DoubleClick(p(100.501, 13.7)));

    app.select_tool(Tool::Draw(DrawMode::Polygon));
    for at in [p(100.5, 13.7), p(100.501, 13.7), p(100.501, 13.701)] {
        app.handle(MapEvent::Click(at));
    }
    app.handle(MapEvent::DoubleClick(p(100.501, 13.701)));

    app.select_tool(Tool::Draw(DrawMode::Circle));
    app.handle(MapEvent::PointerDown(p(100.6, 13.8)));
    app.handle(MapEvent::PointerMove(p(100.601, 13.8)));
    app.handle(MapEvent::PointerUp(p(100.601, 13.8)));

    let kinds: Vec<FeatureKind> = app.store().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FeatureKind::Point,
            FeatureKind::Line,
            FeatureKind::Polygon,
            FeatureKind::Circle
        ]
    );
    let added = app
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, AppEvent::FeatureAdded { .. }))
        .count();
    assert_eq!(added, 4);

    let point_id = app.store().features()[0].id.clone();
    let attrs: BTreeMap<String, String> =
        [("species".to_string(), "teak, young".to_string())].into();
    assert!(app.update_attributes(&point_id, attrs));

    let files = app.export_csv(&app.default_export_options());
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "field-data_points_2024-03-02_00-30-05.csv",
            "field-data_lines_2024-03-02_00-30-05.csv",
            "field-data_polygons_2024-03-02_00-30-05.csv",
        ]
    );

    let points = &files[0].contents;
    assert!(points.starts_with('\u{FEFF}'));
    assert!(points.contains("id,feature_type,created_date,created_time,geometry_wkt,species\n"));
    assert!(points.contains(",point,2024-03-02,00:30:05,POINT(100.5 13.7),\"teak, young\"\n"));

    let polygons = &files[2].contents;
    assert!(polygons.contains("geometry_wkt,area_m2,radius_m\n"));
    assert!(polygons.contains("BUFFER"));

    // erase the circle, then undo the polygon
    app.select_tool(Tool::Draw(DrawMode::Erase));
    app.handle(MapEvent::Click(p(100.6, 13.8)));
    assert_eq!(app.store().len(), 3);
    app.undo();
    assert_eq!(app.store().len(), 2);
    assert_eq!(app.store().discarded().len(), 2);

    let dir = tempdir().unwrap();
    let path = dir.path().join("features.geojson");
    fs::write(&path, app.export_geojson()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back["features"].as_array().unwrap().len(), 2);
}

#[test]
fn measuring_leaves_the_store_alone() {
    let mut app = app();
    app.select_tool(Tool::Measure(MeasureKind::Area));
    for at in [p(0.0, 0.0), p(0.01, 0.0), p(0.01, 0.01)] {
        app.handle(MapEvent::Click(at));
    }
    app.handle(MapEvent::DoubleClick(p(0.01, 0.01)));

    assert!(app.store().is_empty());
    match app.drain_events().as_slice() {
        [AppEvent::MeasurementCompleted { result }] => {
            assert_eq!(result.kind, MeasureKind::Area);
            assert!(result.value > 0.0);
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn scripted_replay_matches_direct_calls() {
    let script = r#"[
        {"step": "select", "tool": {"tool": "draw", "mode": "marker"}},
        {"step": "map", "event": {"event": "click", "at": [100.5, 13.7]}},
        {"step": "map", "event": {"event": "click", "at": [100.6, 13.8]}},
        {"step": "undo"},
        {"step": "zoom", "meters_per_pixel": 2.0},
        {"step": "import", "name": "plots",
         "geojson": {"type": "FeatureCollection", "features": []}}
    ]"#;
    let steps = replay::parse_script(script).unwrap();
    let mut app = app();
    let events = replay::run_script(&mut app, &steps);

    assert_eq!(app.store().len(), 1);
    assert_eq!(app.config().hit_test.meters_per_pixel, 2.0);
    assert_eq!(app.layers().len(), 1);
    assert_eq!(app.layers()[0].file_name(), "plots.geojson");
    assert!(matches!(events.last(), Some(AppEvent::LayerImported { features: 0, .. })));
}
