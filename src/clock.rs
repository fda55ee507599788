use chrono::{DateTime, FixedOffset, Offset, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

pub trait Clock {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Always returns the same instant. Handy for tests and replays.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Capture time of a feature, with its display strings fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub epoch_ms: i64,
    pub date: String,
    pub time: String,
}

impl Stamp {
    pub fn at(epoch_ms: i64, offset_hours: i32) -> Stamp {
        let local = local_time(epoch_ms, offset_hours);
        Stamp {
            epoch_ms,
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
        }
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Converts epoch milliseconds into a fixed UTC offset, not the host timezone.
pub fn local_time(epoch_ms: i64, offset_hours: i32) -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(offset_hours.clamp(-23, 23) * 3600).unwrap_or_else(|| Utc.fix());
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// `YYYY-MM-DD_HH-MM-SS`, the stamp used in export and photo file names.
pub fn file_stamp(epoch_ms: i64, offset_hours: i32) -> String {
    local_time(epoch_ms, offset_hours)
        .format("%Y-%m-%d_%H-%M-%S")
        .to_string()
}

/// `<epoch_ms>-<6 random lowercase alphanumerics>`
pub fn new_feature_id(epoch_ms: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", epoch_ms, suffix)
}
