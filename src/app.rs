use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::{CameraDevice, CameraSession};
use crate::clock::{new_feature_id, Clock, SystemClock};
use crate::config::Config;
use crate::csv_export::{self, CsvFile, ExportOptions};
use crate::error::{DeviceError, ImportError};
use crate::events::{AppEvent, EventBus};
use crate::geojson::{self, VectorLayer};
use crate::gesture::{DrawMode, DrawingEngine, GestureOutcome};
use crate::gps::{Geolocation, GpsFix, GpsTracker, NoGeolocation};
use crate::input::{MapEvent, Preview};
use crate::layers::LayerRegistry;
use crate::measure::{MeasureKind, MeasureOutcome, MeasurementOverlay};
use crate::photo::{self, FieldPhoto, PhotoAlbum};
use crate::store::FeatureStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "mode", rename_all = "snake_case")]
pub enum Tool {
    None,
    Draw(DrawMode),
    Measure(MeasureKind),
}

/// Top-level controller: owns the domain state and routes map input to
/// the active tool. Everything it changes is announced on the event bus.
pub struct FieldMap {
    config: Config,
    clock: Box<dyn Clock>,
    tool: Tool,
    store: FeatureStore,
    drawing: DrawingEngine,
    measuring: MeasurementOverlay,
    photos: PhotoAlbum,
    layers: Vec<VectorLayer>,
    gps: GpsTracker<Box<dyn Geolocation>>,
    events: EventBus,
}

impl FieldMap {
    pub fn new(config: Config) -> FieldMap {
        FieldMap::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> FieldMap {
        let drawing = DrawingEngine::new(
            DrawMode::Marker,
            config.hit_test,
            config.display_utc_offset_hours,
        );
        FieldMap {
            config,
            clock,
            tool: Tool::None,
            store: FeatureStore::new(),
            drawing,
            measuring: MeasurementOverlay::new(MeasureKind::Distance),
            photos: PhotoAlbum::new(),
            layers: Vec::new(),
            gps: GpsTracker::new(Box::new(NoGeolocation)),
            events: EventBus::new(),
        }
    }

    /// Replaces the position source. Any watch on the old one is released.
    pub fn with_geolocation(mut self, source: Box<dyn Geolocation>) -> FieldMap {
        self.gps = GpsTracker::new(source);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn photos(&self) -> &PhotoAlbum {
        &self.photos
    }

    pub fn layers(&self) -> &[VectorLayer] {
        &self.layers
    }

    /// Any in-progress gesture or measurement is dropped.
    pub fn select_tool(&mut self, tool: Tool) {
        debug!(?tool, "tool selected");
        self.tool = tool;
        self.measuring.clear();
        match tool {
            Tool::Draw(mode) => self.drawing.set_mode(mode),
            Tool::Measure(kind) => {
                self.drawing.reset();
                self.measuring = MeasurementOverlay::new(kind);
            }
            Tool::None => self.drawing.reset(),
        }
    }

    /// Called by the map view on zoom so erase tolerances stay in pixels.
    pub fn set_meters_per_pixel(&mut self, meters_per_pixel: f64) {
        self.config.hit_test.meters_per_pixel = meters_per_pixel;
        self.drawing.set_tolerance(self.config.hit_test);
    }

    pub fn handle(&mut self, event: MapEvent) {
        match self.tool {
            Tool::None => {}
            Tool::Draw(_) => {
                match self
                    .drawing
                    .handle(event, &mut self.store, self.clock.as_ref())
                {
                    GestureOutcome::Added(id) => self.events.publish(AppEvent::FeatureAdded { id }),
                    GestureOutcome::Erased(id) => {
                        self.events.publish(AppEvent::FeatureRemoved { id })
                    }
                    GestureOutcome::Missed(at) => {
                        self.events.publish(AppEvent::EraseMissed { at })
                    }
                    GestureOutcome::Ignored
                    | GestureOutcome::Updated
                    | GestureOutcome::Cancelled => {}
                }
            }
            Tool::Measure(_) => {
                if let MeasureOutcome::Completed(result) = self.measuring.handle(event) {
                    self.events.publish(AppEvent::MeasurementCompleted { result });
                }
            }
        }
    }

    pub fn preview(&self) -> Vec<Preview> {
        match self.tool {
            Tool::None => Vec::new(),
            Tool::Draw(_) => self.drawing.preview(),
            Tool::Measure(_) => self.measuring.preview(),
        }
    }

    pub fn undo(&mut self) -> Option<String> {
        let id = self.store.undo_last()?.id.clone();
        self.events.publish(AppEvent::FeatureRemoved { id: id.clone() });
        Some(id)
    }

    pub fn remove_feature(&mut self, id: &str) -> bool {
        if self.store.remove_by_id(id).is_none() {
            return false;
        }
        self.events.publish(AppEvent::FeatureRemoved { id: id.to_string() });
        true
    }

    pub fn update_attributes(&mut self, id: &str, attributes: BTreeMap<String, String>) -> bool {
        if !self.store.update_attributes(id, attributes) {
            return false;
        }
        self.events.publish(AppEvent::AttributesUpdated { id: id.to_string() });
        true
    }

    /// Asks the camera component, through the bus, for a photo of `feature_id`.
    pub fn request_photo(&mut self, feature_id: &str) -> bool {
        if !self.store.contains(feature_id) {
            warn!(feature_id, "photo requested for unknown feature");
            return false;
        }
        self.events.publish(AppEvent::PhotoRequested {
            feature_id: feature_id.to_string(),
        });
        true
    }

    pub fn gps(&self) -> &GpsTracker<Box<dyn Geolocation>> {
        &self.gps
    }

    pub fn start_tracking(&mut self) -> Result<(), DeviceError> {
        self.gps.start()
    }

    pub fn stop_tracking(&mut self) {
        self.gps.stop();
    }

    pub fn toggle_tracking(&mut self) -> Result<bool, DeviceError> {
        self.gps.toggle()
    }

    /// Position callback from the watch. Ignored unless tracking.
    pub fn on_gps_position(&mut self, fix: GpsFix) {
        self.gps.on_position(fix);
    }

    pub fn on_gps_error(&mut self, err: DeviceError) {
        self.gps.on_error(err);
    }

    pub fn latest_gps_fix(&self) -> Option<GpsFix> {
        self.gps.latest()
    }

    pub fn new_photo_id(&self) -> String {
        format!("photo-{}", new_feature_id(self.clock.now_ms()))
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn add_photo(&mut self, photo: FieldPhoto) -> &FieldPhoto {
        self.events.publish(AppEvent::PhotoAdded {
            id: photo.id.clone(),
            linked_feature_id: photo.linked_feature_id.clone(),
        });
        self.photos.add(photo)
    }

    /// Adds an existing JPEG. The live fix is used when there is one,
    /// otherwise the EXIF position, if any.
    pub fn import_photo(&mut self, jpeg: &[u8], linked_feature_id: Option<String>) -> &FieldPhoto {
        let gps = self.gps.latest().or_else(|| match photo::read_exif_position(jpeg) {
            Ok(Some((lat, lng))) => Some(GpsFix {
                lat,
                lng,
                // EXIF carries no accuracy estimate.
                accuracy_m: 0.0,
                heading_deg: None,
            }),
            Ok(None) => None,
            Err(err) => {
                debug!(%err, "photo has no readable EXIF");
                None
            }
        });
        let photo = FieldPhoto::from_jpeg(
            self.new_photo_id(),
            jpeg,
            self.clock.now_ms(),
            gps,
            linked_feature_id,
        );
        self.add_photo(photo)
    }

    /// Shoots a frame from an open camera, tagged with the live fix.
    pub fn capture_photo<D: CameraDevice>(
        &mut self,
        camera: &mut CameraSession<D>,
        linked_feature_id: Option<String>,
    ) -> Result<&FieldPhoto, DeviceError> {
        let photo = camera.capture(
            self.new_photo_id(),
            self.clock.now_ms(),
            self.gps.latest(),
            linked_feature_id,
        )?;
        Ok(self.add_photo(photo))
    }

    /// Drops render handles whose feature is no longer stored.
    pub fn prune_layers<H>(&self, registry: &mut LayerRegistry<H>) -> Vec<H> {
        registry.retain_features(|id| self.store.contains(id))
    }

    pub fn import_geojson(&mut self, name: &str, text: &str) -> Result<&VectorLayer, ImportError> {
        let layer = geojson::import_geojson(name, text)?;
        self.events.publish(AppEvent::LayerImported {
            name: layer.name.clone(),
            features: layer.feature_count(),
        });
        self.layers.push(layer);
        Ok(&self.layers[self.layers.len() - 1])
    }

    pub fn export_csv(&self, options: &ExportOptions) -> Vec<CsvFile> {
        csv_export::export_by_family(
            &self.store,
            options,
            self.clock.now_ms(),
            self.config.display_utc_offset_hours,
        )
    }

    pub fn export_all_csv(&self, options: &ExportOptions) -> Option<CsvFile> {
        csv_export::export_all(
            &self.store,
            options,
            self.clock.now_ms(),
            self.config.display_utc_offset_hours,
        )
    }

    pub fn export_geojson(&self) -> String {
        geojson::features_to_geojson(&self.store).to_string()
    }

    pub fn default_export_options(&self) -> ExportOptions {
        ExportOptions::from(&self.config.export)
    }

    pub fn drain_events(&mut self) -> Vec<AppEvent> {
        self.events.drain()
    }
}
