use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hit_test: HitTolerance,
    /// Hours east of UTC for display strings and file names.
    pub display_utc_offset_hours: i32,
    pub camera: CameraConfig,
    pub export: ExportDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hit_test: HitTolerance::default(),
            display_utc_offset_hours: 7,
            camera: CameraConfig::default(),
            export: ExportDefaults::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Config::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Erase hit-test tolerances, in screen pixels at the current zoom.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HitTolerance {
    pub point_tolerance_px: f64,
    pub line_tolerance_px: f64,
    pub meters_per_pixel: f64,
}

impl Default for HitTolerance {
    fn default() -> Self {
        HitTolerance {
            point_tolerance_px: 12.0,
            line_tolerance_px: 8.0,
            meters_per_pixel: 1.0,
        }
    }
}

impl HitTolerance {
    pub fn point_meters(&self) -> f64 {
        self.point_tolerance_px * self.meters_per_pixel
    }

    pub fn line_meters(&self) -> f64 {
        self.line_tolerance_px * self.meters_per_pixel
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub max_attempts: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig { max_attempts: 4 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    pub include_geometry: bool,
    pub include_attributes: bool,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        ExportDefaults {
            include_geometry: true,
            include_attributes: true,
        }
    }
}
