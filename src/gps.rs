//! Device geolocation: one continuous watch per tracking session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DeviceError;
use crate::geodesy::LngLat;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
    pub heading_deg: Option<f64>,
}

impl GpsFix {
    pub fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(pub u32);

/// The platform's position source, e.g. `navigator.geolocation`.
pub trait Geolocation {
    fn watch(&mut self, options: &WatchOptions) -> Result<WatchId, DeviceError>;
    fn clear_watch(&mut self, id: WatchId);
}

impl<G: Geolocation + ?Sized> Geolocation for Box<G> {
    fn watch(&mut self, options: &WatchOptions) -> Result<WatchId, DeviceError> {
        (**self).watch(options)
    }

    fn clear_watch(&mut self, id: WatchId) {
        (**self).clear_watch(id)
    }
}

/// Source for hosts without a position sensor.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGeolocation;

impl Geolocation for NoGeolocation {
    fn watch(&mut self, _options: &WatchOptions) -> Result<WatchId, DeviceError> {
        Err(DeviceError::Unsupported)
    }

    fn clear_watch(&mut self, _id: WatchId) {}
}

pub struct GpsTracker<G: Geolocation> {
    source: G,
    options: WatchOptions,
    watch: Option<WatchId>,
    latest: Option<GpsFix>,
    last_error: Option<DeviceError>,
}

impl<G: Geolocation> GpsTracker<G> {
    pub fn new(source: G) -> GpsTracker<G> {
        GpsTracker {
            source,
            options: WatchOptions::default(),
            watch: None,
            latest: None,
            last_error: None,
        }
    }

    /// Starting twice keeps the existing watch.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if self.watch.is_some() {
            return Ok(());
        }
        match self.source.watch(&self.options) {
            Ok(id) => {
                debug!(?id, "gps watch started");
                self.watch = Some(id);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "gps watch failed to start");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Releases the watch and forgets the last fix.
    pub fn stop(&mut self) {
        self.latest = None;
        if let Some(id) = self.watch.take() {
            debug!(?id, "gps watch released");
            self.source.clear_watch(id);
        }
    }

    pub fn toggle(&mut self) -> Result<bool, DeviceError> {
        if self.is_tracking() {
            self.stop();
            Ok(false)
        } else {
            self.start().map(|_| true)
        }
    }

    /// Replaces the previous fix; no history is kept.
    pub fn on_position(&mut self, fix: GpsFix) {
        if self.watch.is_some() {
            self.latest = Some(fix);
            self.last_error = None;
        }
    }

    /// Permanent failures end the watch; transient ones leave it running.
    pub fn on_error(&mut self, err: DeviceError) {
        warn!(%err, "gps error");
        if !err.is_transient() {
            self.stop();
        }
        self.last_error = Some(err);
    }

    pub fn is_tracking(&self) -> bool {
        self.watch.is_some()
    }

    pub fn latest(&self) -> Option<GpsFix> {
        self.latest
    }

    pub fn last_error(&self) -> Option<&DeviceError> {
        self.last_error.as_ref()
    }
}

impl<G: Geolocation> Drop for GpsTracker<G> {
    fn drop(&mut self) {
        self.stop();
    }
}
