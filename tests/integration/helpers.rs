//! Helper functions for integration tests

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use telemetry_hub::{
    Hub,
    api::{ApiConfig, ApiState, spawn_api_server},
    registry::{RegistryBackend, RegistryError, RegistryResult},
};

/// Start an API server for `hub` on a random local port
pub async fn spawn_test_api(hub: Arc<Hub>) -> SocketAddr {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..Default::default()
    };

    spawn_api_server(config, ApiState::new(hub)).await.unwrap()
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// A payload as an agent would send it
pub fn create_payload(agent_id: &str, timestamp: DateTime<Utc>, cpu: f64) -> serde_json::Value {
    serde_json::json!({
        "agent_id": agent_id,
        "timestamp": timestamp.to_rfc3339(),
        "interval_seconds": 5,
        "metrics": {
            "cpu_percent": cpu,
            "load_avg_1m": 0.42,
            "memory_percent": 48.3,
            "disk_percent": 61.0,
            "network_in_bytes_per_sec": 1200.0,
            "network_out_bytes_per_sec": 800.0
        }
    })
}

pub fn create_payload_now(agent_id: &str, cpu: f64) -> serde_json::Value {
    create_payload(agent_id, Utc::now(), cpu)
}

/// Registry backend whose writes always fail
pub struct FailingBackend;

#[async_trait]
impl RegistryBackend for FailingBackend {
    async fn load(&self) -> RegistryResult<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    async fn save(&self, _services: &BTreeSet<String>) -> RegistryResult<()> {
        Err(RegistryError::IoError(std::io::Error::other(
            "read-only file system",
        )))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}
