//! Inbound agent payloads
//!
//! Parsing happens in two steps. The raw body is decoded into an
//! [`IngestPayload`], then [`IngestPayload::validate`] checks the required
//! fields and normalizes the reported metrics into a [`MetricSample`]. Both
//! steps are pure, so a rejected payload never touches hub state.
//!
//! ## Normalization
//!
//! Agents report metrics under their own field names. The hub maps them like
//! this, and any field the agent left out (or sent as `null`) becomes `0`:
//!
//! | agent field                 | sample field |
//! |-----------------------------|--------------|
//! | `cpu_percent`               | `cpu`        |
//! | `memory_percent`            | `memory`     |
//! | `disk_percent`              | `disk`       |
//! | `network_in_bytes_per_sec`  | `net_in`     |
//! | `network_out_bytes_per_sec` | `net_out`    |
//!
//! Every other field in `metrics` is ignored.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::MetricSample;
use crate::registry::RegistryError;

/// Errors an ingestion call can fail with
#[derive(Debug)]
pub enum IngestError {
    /// Malformed body or missing required field (the agent can fix this)
    InvalidPayload(String),

    /// The new service could not be persisted to the registry
    Persistence(RegistryError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::InvalidPayload(msg) => write!(f, "invalid payload: {}", msg),
            IngestError::Persistence(err) => write!(f, "failed to register service: {}", err),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Persistence(err) => Some(err),
            IngestError::InvalidPayload(_) => None,
        }
    }
}

impl From<RegistryError> for IngestError {
    fn from(err: RegistryError) -> Self {
        IngestError::Persistence(err)
    }
}

/// Body of `POST /ingest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestPayload {
    pub agent_id: Option<String>,
    pub timestamp: Option<String>,
    pub metrics: Option<ReportedMetrics>,
}

/// Metrics as reported by an agent
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReportedMetrics {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub network_in_bytes_per_sec: Option<f64>,
    pub network_out_bytes_per_sec: Option<f64>,
}

impl ReportedMetrics {
    /// Map onto the hub's sample schema, defaulting absent fields to zero
    pub fn normalize(&self, timestamp: i64) -> MetricSample {
        MetricSample {
            timestamp,
            cpu: self.cpu_percent.unwrap_or_default(),
            memory: self.memory_percent.unwrap_or_default(),
            disk: self.disk_percent.unwrap_or_default(),
            net_in: self.network_in_bytes_per_sec.unwrap_or_default(),
            net_out: self.network_out_bytes_per_sec.unwrap_or_default(),
        }
    }
}

/// A validated payload, ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct Ingestion {
    pub service: String,
    pub sample: MetricSample,
}

impl IngestPayload {
    /// Decode a raw request body
    ///
    /// The body and its `metrics` member must be JSON objects, positional
    /// arrays are rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(body).map_err(invalid_body)?;

        let Some(object) = value.as_object() else {
            return Err(IngestError::InvalidPayload(
                "body must be a JSON object".to_string(),
            ));
        };
        if let Some(metrics) = object.get("metrics")
            && !(metrics.is_object() || metrics.is_null())
        {
            return Err(IngestError::InvalidPayload(
                "`metrics` must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(invalid_body)
    }

    /// Check required fields and build the normalized sample
    pub fn validate(self) -> Result<Ingestion, IngestError> {
        let service = required(self.agent_id, "agent_id")?;
        let raw_timestamp = required(self.timestamp, "timestamp")?;
        let timestamp = parse_timestamp(&raw_timestamp)?;

        Ok(Ingestion {
            service,
            sample: self.metrics.unwrap_or_default().normalize(timestamp),
        })
    }
}

fn invalid_body(err: serde_json::Error) -> IngestError {
    IngestError::InvalidPayload(format!("body is not a valid payload: {err}"))
}

fn required(value: Option<String>, field: &str) -> Result<String, IngestError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(IngestError::InvalidPayload(format!(
            "missing required field `{field}`"
        ))),
    }
}

/// Parse an ISO-8601 timestamp into whole epoch seconds
///
/// Accepts a `Z` suffix or an explicit offset. A timestamp without any offset
/// is taken to be UTC. Fractional seconds are truncated.
pub fn parse_timestamp(raw: &str) -> Result<i64, IngestError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.timestamp());
    }

    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(parsed.timestamp());
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp())
        .map_err(|_| IngestError::InvalidPayload(format!("unparseable timestamp `{raw}`")))
}
