use thiserror::Error;

/// Rejected GeoJSON input. Import is all-or-nothing.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON root must be an object")]
    NotAnObject,

    #[error("unsupported GeoJSON type {0:?}, expected FeatureCollection or Feature")]
    UnsupportedType(String),

    #[error("GeoJSON object has no \"type\" member")]
    MissingType,

    #[error("FeatureCollection has no \"features\" array")]
    MissingFeatures,
}

/// Failure reported by a camera or geolocation device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no matching device found")]
    NotFound,

    #[error("device is busy")]
    Busy,

    #[error("requested constraints cannot be satisfied")]
    Overconstrained,

    #[error("device timed out")]
    Timeout,

    #[error("not supported on this device")]
    Unsupported,

    #[error("{0}")]
    Other(String),
}

impl DeviceError {
    /// Transient failures are worth retrying with relaxed constraints.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DeviceError::Busy | DeviceError::Overconstrained | DeviceError::Timeout
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            DeviceError::PermissionDenied => {
                "Access was denied. Allow access in the browser settings and try again.".to_string()
            }
            DeviceError::NotFound => "No suitable device was found.".to_string(),
            DeviceError::Busy => {
                "The device is in use by another application. Close it and try again.".to_string()
            }
            DeviceError::Overconstrained => {
                "The device does not support the requested settings.".to_string()
            }
            DeviceError::Timeout => "The device did not respond in time.".to_string(),
            DeviceError::Unsupported => "This browser or device is not supported.".to_string(),
            DeviceError::Other(msg) => format!("Device error: {}", msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("cannot read EXIF data: {0}")]
    Exif(#[from] exif::Error),
}
