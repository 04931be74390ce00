//! Metric collection agent
//!
//! The agent samples host counters on a fixed interval and pushes each sample
//! to the hub's `/ingest` endpoint. It keeps no state beyond the previous
//! network counters; a failed delivery is logged and the sample is dropped,
//! the next tick simply sends a fresh one.

pub mod collector;

pub use collector::{HostMetrics, HostSampler};

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::util::{env_or, env_parsed_or};

const INGEST_URL: &str = "INGEST_URL";
const AGENT_ID: &str = "AGENT_ID";
const AGENT_TOKEN: &str = "AGENT_TOKEN";
const INTERVAL_SECONDS: &str = "INTERVAL_SECONDS";
const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";

const DEFAULT_INGEST_URL: &str = "http://127.0.0.1:8000/ingest";
const DEFAULT_AGENT_ID: &str = "local-test";
const DEFAULT_AGENT_TOKEN: &str = "test-token";
const DEFAULT_INTERVAL_SECONDS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT: u64 = 5;

/// Agent configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub ingest_url: String,
    pub agent_id: String,
    pub token: String,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            ingest_url: env_or(INGEST_URL, DEFAULT_INGEST_URL),
            agent_id: env_or(AGENT_ID, DEFAULT_AGENT_ID),
            token: env_or(AGENT_TOKEN, DEFAULT_AGENT_TOKEN),
            interval: Duration::from_secs(env_parsed_or(
                INTERVAL_SECONDS,
                DEFAULT_INTERVAL_SECONDS,
            )),
            request_timeout: Duration::from_secs(env_parsed_or(
                REQUEST_TIMEOUT,
                DEFAULT_REQUEST_TIMEOUT,
            )),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ingest_url: DEFAULT_INGEST_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            token: DEFAULT_AGENT_TOKEN.to_string(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

/// Body the agent posts to `/ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPayload {
    pub agent_id: String,
    pub timestamp: String,
    pub interval_seconds: u64,
    pub metrics: HostMetrics,
}

impl AgentPayload {
    pub fn new(config: &AgentConfig, metrics: HostMetrics, taken_at: DateTime<Utc>) -> Self {
        Self {
            agent_id: config.agent_id.clone(),
            timestamp: taken_at.to_rfc3339(),
            interval_seconds: config.interval.as_secs(),
            metrics,
        }
    }
}

/// Pushes samples to the hub
pub struct Agent {
    config: AgentConfig,
    client: Client,
}

impl Agent {
    pub fn new(config: AgentConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Deliver one payload, non-2xx responses count as failures
    #[instrument(skip_all, fields(agent_id = %payload.agent_id))]
    pub async fn send(&self, payload: &AgentPayload) -> anyhow::Result<()> {
        self.client
            .post(&self.config.ingest_url)
            .bearer_auth(&self.config.token)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        debug!("metrics sent to {}", self.config.ingest_url);
        Ok(())
    }

    /// Sample and send forever
    pub async fn run(self, mut sampler: HostSampler) {
        info!(
            "monitoring agent {} started, reporting to {} every {}s",
            self.config.agent_id,
            self.config.ingest_url,
            self.config.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let metrics = sampler.sample().await;
            let payload = AgentPayload::new(&self.config, metrics, Utc::now());

            if let Err(e) = self.send(&payload).await {
                error!("failed to send metrics: {e}");
            }
        }
    }
}
