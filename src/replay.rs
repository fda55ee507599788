//! Scripted sessions: a JSON list of steps fed through [`FieldMap`].

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::app::{FieldMap, Tool};
use crate::error::DeviceError;
use crate::events::AppEvent;
use crate::gps::{Geolocation, GpsFix, WatchId, WatchOptions};
use crate::input::MapEvent;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Select { tool: Tool },
    Map { event: MapEvent },
    /// `feature` is the position in store order at the time of the step.
    SetAttributes {
        feature: usize,
        attributes: BTreeMap<String, String>,
    },
    Undo,
    Zoom { meters_per_pixel: f64 },
    Import { name: String, geojson: serde_json::Value },
    Tracking { enabled: bool },
    /// Position delivered by the watch; dropped while not tracking.
    Fix { fix: GpsFix },
}

/// Position source for scripted sessions: every watch is granted and the
/// positions arrive as `fix` steps.
#[derive(Debug, Default)]
pub struct ScriptedGeolocation {
    next_id: u32,
}

impl Geolocation for ScriptedGeolocation {
    fn watch(&mut self, _options: &WatchOptions) -> Result<WatchId, DeviceError> {
        self.next_id += 1;
        Ok(WatchId(self.next_id))
    }

    fn clear_watch(&mut self, _id: WatchId) {}
}

pub fn parse_script(text: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Runs every step and returns the events they produced, in order.
pub fn run_script(app: &mut FieldMap, steps: &[Step]) -> Vec<AppEvent> {
    let mut events = Vec::new();
    for step in steps {
        match step {
            Step::Select { tool } => app.select_tool(*tool),
            Step::Map { event } => app.handle(*event),
            Step::SetAttributes {
                feature,
                attributes,
            } => {
                let id = app.store().features().get(*feature).map(|f| f.id.clone());
                match id {
                    Some(id) => {
                        app.update_attributes(&id, attributes.clone());
                    }
                    None => warn!(feature = *feature, "no feature at this position"),
                }
            }
            Step::Undo => {
                app.undo();
            }
            Step::Zoom { meters_per_pixel } => app.set_meters_per_pixel(*meters_per_pixel),
            Step::Import { name, geojson } => {
                if let Err(err) = app.import_geojson(name, &geojson.to_string()) {
                    warn!(%err, %name, "layer import rejected");
                }
            }
            Step::Tracking { enabled: true } => {
                if let Err(err) = app.start_tracking() {
                    warn!(%err, "tracking unavailable");
                }
            }
            Step::Tracking { enabled: false } => app.stop_tracking(),
            Step::Fix { fix } => app.on_gps_position(*fix),
        }
        events.extend(app.drain_events());
    }
    events
}
