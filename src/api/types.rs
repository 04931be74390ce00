//! API response types
//!
//! Metric history and alert history are returned as bare arrays of
//! [`MetricSample`](crate::MetricSample) and
//! [`AlertRecord`](crate::alerts::AlertRecord); everything else is wrapped in
//! one of the small objects below.

use serde::{Deserialize, Serialize};

use crate::status::ServiceState;

/// Response for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Response for a successful POST /ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ok: bool,
}

/// Response for GET /status/:service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ServiceState,
}

/// Response for GET /alerts/active/:service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCountResponse {
    pub count: usize,
}
