use std::collections::VecDeque;

use serde::Serialize;

use crate::geodesy::LngLat;
use crate::measure::Measurement;

/// Cross-component notifications, delivered in publish order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    FeatureAdded { id: String },
    FeatureRemoved { id: String },
    AttributesUpdated { id: String },
    /// Erase click that hit nothing; front ends flash a marker here.
    EraseMissed { at: LngLat },
    MeasurementCompleted { result: Measurement },
    /// Ask the camera component to shoot a photo for this feature.
    PhotoRequested { feature_id: String },
    PhotoAdded { id: String, linked_feature_id: Option<String> },
    LayerImported { name: String, features: usize },
}

/// FIFO mailbox owned by the application controller.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<AppEvent>,
}

impl EventBus {
    pub fn new() -> EventBus {
        EventBus::default()
    }

    pub fn publish(&mut self, event: AppEvent) {
        self.queue.push_back(event);
    }

    pub fn next(&mut self) -> Option<AppEvent> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<AppEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
