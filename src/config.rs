use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use tracing::trace;

use crate::alerts::DEFAULT_CPU_LIMIT;
use crate::util;

/// Hub configuration
///
/// Every field is optional in the JSON file; missing fields take the defaults
/// below.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Address the HTTP API binds to
    pub bind_addr: SocketAddr,

    /// Where the service registry is persisted
    pub registry_path: PathBuf,

    /// Alert thresholds
    pub thresholds: AlertThresholds,

    /// Maximum samples kept per service (unbounded if absent)
    pub retention: Option<usize>,

    /// Bearer token required on `/ingest` (pass-through if absent)
    pub auth_token: Option<String>,

    /// Directory of a prebuilt dashboard to serve for unmatched paths
    pub static_dir: Option<PathBuf>,

    /// Enable permissive CORS for the dashboard
    pub enable_cors: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_addr: util::default_bind_addr(),
            registry_path: default_registry_path(),
            thresholds: AlertThresholds::default(),
            retention: None,
            auth_token: None,
            static_dir: None,
            enable_cors: true,
        }
    }
}

/// Per-metric alert limits, `null` disables a rule
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct AlertThresholds {
    #[serde(default = "default_cpu_limit")]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory: Option<f64>,
    #[serde(default)]
    pub disk: Option<f64>,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu: default_cpu_limit(),
            memory: None,
            disk: None,
        }
    }
}

fn default_cpu_limit() -> Option<f64> {
    Some(DEFAULT_CPU_LIMIT)
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("./services.json")
}

const HUB_ADDR: &str = "HUB_ADDR";
const HUB_PORT: &str = "HUB_PORT";
const HUB_REGISTRY_PATH: &str = "HUB_REGISTRY_PATH";
const HUB_AUTH_TOKEN: &str = "HUB_AUTH_TOKEN";

impl HubConfig {
    /// Apply `HUB_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Values that do not parse are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup(HUB_ADDR).and_then(|v| v.parse::<IpAddr>().ok()) {
            self.bind_addr.set_ip(addr);
        }
        if let Some(port) = lookup(HUB_PORT).and_then(|v| v.parse::<u16>().ok()) {
            self.bind_addr.set_port(port);
        }
        if let Some(path) = lookup(HUB_REGISTRY_PATH).filter(|v| !v.is_empty()) {
            self.registry_path = PathBuf::from(path);
        }
        if let Some(token) = lookup(HUB_AUTH_TOKEN).filter(|v| !v.is_empty()) {
            self.auth_token = Some(token);
        }
        self
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<HubConfig> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
