use std::path::{Path, PathBuf};

use tracing::debug;

pub use app::{FieldMap, Tool};
pub use clock::{Clock, FixedClock, Stamp, SystemClock};
pub use config::Config;
pub use csv_export::{CsvFile, ExportOptions};
pub use error::{ConfigError, DeviceError, ImportError, PhotoError};
pub use events::AppEvent;
pub use feature::{DrawnFeature, Family, FeatureKind, Geometry};
pub use geodesy::LngLat;
pub use gesture::DrawMode;
pub use input::{MapEvent, Preview};
pub use measure::{MeasureKind, Measurement};
pub use photo::FieldPhoto;
pub use store::FeatureStore;

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod events;
pub mod feature;
pub mod geodesy;
pub mod geojson;
pub mod gesture;
pub mod gps;
pub mod input;
pub mod layers;
pub mod measure;
pub mod photo;
pub mod replay;
pub mod store;
pub mod units;
pub mod wkt;

/// JPEG files under `src_root`, sorted. Unreadable entries are skipped.
pub fn visit_paths(src_root: &Path) -> Result<Vec<PathBuf>, globwalk::GlobError> {
    let walker = globwalk::GlobWalkerBuilder::from_patterns(src_root, &["**/*.{jpg,jpeg}"])
        .case_insensitive(true)
        .build()?;
    let mut paths: Vec<PathBuf> = walker
        .filter_map(|item| match item {
            Ok(entry) => Some(entry.into_path()),
            Err(err) => {
                debug!(%err, "skipping entry");
                None
            }
        })
        .collect();
    paths.sort();
    Ok(paths)
}
