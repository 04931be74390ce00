pub mod alerts;
pub mod api;
pub mod config;
pub mod hub;
pub mod ingest;
pub mod registry;
pub mod status;
pub mod store;
pub mod util;

#[cfg(feature = "agent")]
pub mod agent;

pub use hub::Hub;

use serde::{Deserialize, Serialize};

/// One normalized telemetry point for a service.
///
/// Samples are immutable once appended. The timestamp is whatever the agent
/// reported (in whole seconds since the epoch), so a skewed agent may append
/// samples whose timestamps go backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: i64,
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub net_in: f64,
    pub net_out: f64,
}
