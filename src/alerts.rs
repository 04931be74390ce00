//! Threshold alerts
//!
//! Rule evaluation is a pure function of one sample: every rule whose metric
//! is strictly above its limit yields one [`AlertRecord`]. The engine appends
//! those records to the service's alert history. There is no notion of an
//! alert being resolved, so a service that stays hot produces one record per
//! sample.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::MetricSample;
use crate::config::AlertThresholds;
use crate::store::ServiceLog;

/// CPU limit used when nothing else is configured
pub const DEFAULT_CPU_LIMIT: f64 = 80.0;

/// Metric an alert was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    Cpu,
    Memory,
    Disk,
}

impl AlertKind {
    /// Get the string representation (upper case)
    ///
    /// This matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Cpu => "CPU",
            AlertKind::Memory => "MEMORY",
            AlertKind::Disk => "DISK",
        }
    }

    fn value_of(&self, sample: &MetricSample) -> f64 {
        match self {
            AlertKind::Cpu => sample.cpu,
            AlertKind::Memory => sample.memory,
            AlertKind::Disk => sample.disk,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One threshold breach, stamped with the sample's timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub value: f64,
}

/// Fires when `kind`'s value is strictly greater than `limit`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub kind: AlertKind,
    pub limit: f64,
}

impl ThresholdRule {
    pub fn new(kind: AlertKind, limit: f64) -> Self {
        Self { kind, limit }
    }

    pub fn check(&self, sample: &MetricSample) -> Option<AlertRecord> {
        let value = self.kind.value_of(sample);
        (value > self.limit).then_some(AlertRecord {
            timestamp: sample.timestamp,
            kind: self.kind,
            value,
        })
    }
}

/// Ordered set of threshold rules
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRules {
    rules: Vec<ThresholdRule>,
}

impl AlertRules {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    /// Build the rule set from configured limits, skipping disabled ones
    pub fn from_thresholds(thresholds: &AlertThresholds) -> Self {
        let rules = [
            (AlertKind::Cpu, thresholds.cpu),
            (AlertKind::Memory, thresholds.memory),
            (AlertKind::Disk, thresholds.disk),
        ]
        .into_iter()
        .filter_map(|(kind, limit)| limit.map(|limit| ThresholdRule::new(kind, limit)))
        .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    pub fn evaluate(&self, sample: &MetricSample) -> Vec<AlertRecord> {
        self.rules
            .iter()
            .filter_map(|rule| rule.check(sample))
            .collect()
    }
}

impl Default for AlertRules {
    fn default() -> Self {
        Self::new(vec![ThresholdRule::new(AlertKind::Cpu, DEFAULT_CPU_LIMIT)])
    }
}

/// Evaluates samples and keeps every service's alert history
#[derive(Debug, Default)]
pub struct AlertEngine {
    rules: AlertRules,
    history: ServiceLog<AlertRecord>,
}

impl AlertEngine {
    pub fn new(rules: AlertRules) -> Self {
        Self {
            rules,
            history: ServiceLog::new(),
        }
    }

    pub fn rules(&self) -> &AlertRules {
        &self.rules
    }

    /// Run all rules against `sample` and record what fired
    pub async fn evaluate(&self, service: &str, sample: &MetricSample) -> Vec<AlertRecord> {
        let fired = self.rules.evaluate(sample);
        for alert in &fired {
            warn!(
                service,
                kind = %alert.kind,
                value = alert.value,
                "threshold exceeded"
            );
            self.history.append(service, *alert).await;
        }
        fired
    }

    /// Full alert history of `service`
    pub async fn alerts(&self, service: &str) -> Vec<AlertRecord> {
        self.history.history(service).await
    }

    /// Number of alerts ever recorded for `service`
    ///
    /// This is cumulative: alerts are never cleared.
    pub async fn active_count(&self, service: &str) -> usize {
        self.history.count(service).await
    }
}
