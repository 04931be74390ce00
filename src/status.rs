//! Liveness derived from how recently a service reported
//!
//! Status is never stored. It is recomputed on every query from the latest
//! sample in the metrics store and the current wall-clock time.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::MetricSample;

/// Maximum age (in seconds) of the latest sample for a service to count as up
pub const FRESHNESS_WINDOW_SECS: i64 = 15;

/// Derived liveness of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Up,
    Down,
}

impl ServiceState {
    /// Get the string representation (upper case)
    ///
    /// This matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Up => "UP",
            ServiceState::Down => "DOWN",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine liveness from the latest sample at time `now` (epoch seconds)
///
/// A sample exactly [`FRESHNESS_WINDOW_SECS`] old is still fresh. Samples
/// stamped in the future (agent clock ahead of ours) count as fresh.
pub fn evaluate(latest: Option<&MetricSample>, now: i64) -> ServiceState {
    match latest {
        Some(sample) if now - sample.timestamp <= FRESHNESS_WINDOW_SECS => ServiceState::Up,
        _ => ServiceState::Down,
    }
}

/// Current wall-clock time in epoch seconds
pub fn now() -> i64 {
    Utc::now().timestamp()
}
