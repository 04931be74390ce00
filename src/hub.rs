//! The ingestion and service-status core
//!
//! [`Hub`] owns the service registry, the metrics store and the alert engine,
//! and is the only thing that mutates them. Each component does its own
//! locking, so the hub itself is shared as a plain `Arc<Hub>`.
//!
//! Only the registry is durable. Metric and alert history live in memory and
//! start out empty after every restart, even for services the registry still
//! knows about.

use tracing::{info, instrument};

use crate::MetricSample;
use crate::alerts::{AlertEngine, AlertRecord, AlertRules};
use crate::config::HubConfig;
use crate::ingest::{IngestError, IngestPayload, Ingestion};
use crate::registry::{JsonFileBackend, RegistryResult, ServiceRegistry};
use crate::status::{self, ServiceState};
use crate::store::MetricsStore;

pub struct Hub {
    registry: ServiceRegistry,
    metrics: MetricsStore,
    alerts: AlertEngine,
}

impl Hub {
    pub fn new(registry: ServiceRegistry, metrics: MetricsStore, alerts: AlertEngine) -> Self {
        Self {
            registry,
            metrics,
            alerts,
        }
    }

    /// Build a hub from configuration, loading the registry from disk
    pub async fn from_config(config: &HubConfig) -> RegistryResult<Self> {
        let backend = JsonFileBackend::new(&config.registry_path);
        let registry = ServiceRegistry::load(Box::new(backend)).await?;

        Ok(Self::new(
            registry,
            MetricsStore::with_retention(config.retention),
            AlertEngine::new(AlertRules::from_thresholds(&config.thresholds)),
        ))
    }

    /// Hub with default rules and a registry that is not persisted
    pub fn in_memory() -> Self {
        Self::new(
            ServiceRegistry::in_memory(),
            MetricsStore::new(),
            AlertEngine::default(),
        )
    }

    /// Decode, validate and apply a raw `/ingest` body
    pub async fn ingest_bytes(&self, body: &[u8]) -> Result<Vec<AlertRecord>, IngestError> {
        let ingestion = IngestPayload::from_slice(body)?.validate()?;
        self.ingest(ingestion).await
    }

    /// Apply a validated payload
    ///
    /// The service is registered first. If that fails, nothing else is
    /// recorded. Returns the alerts the sample raised.
    #[instrument(skip_all, fields(service = %ingestion.service))]
    pub async fn ingest(&self, ingestion: Ingestion) -> Result<Vec<AlertRecord>, IngestError> {
        let Ingestion { service, sample } = ingestion;

        if self.registry.register(&service).await? {
            info!("new service {service}");
        }

        let fired = {
            let mut history = self.metrics.writer(&service).await;
            history.push(sample);
            // per-service alert order follows sample order
            self.alerts.evaluate(&service, &sample).await
        };

        info!(service = %service, cpu = sample.cpu, "received metrics");
        Ok(fired)
    }

    /// All known services, sorted
    pub async fn services(&self) -> Vec<String> {
        self.registry.list().await
    }

    pub async fn history(&self, service: &str) -> Vec<MetricSample> {
        self.metrics.history(service).await
    }

    /// Liveness of `service` right now
    pub async fn status(&self, service: &str) -> ServiceState {
        self.status_at(service, status::now()).await
    }

    /// Liveness of `service` as seen at `now` (epoch seconds)
    pub async fn status_at(&self, service: &str, now: i64) -> ServiceState {
        let latest = self.metrics.latest(service).await;
        status::evaluate(latest.as_ref(), now)
    }

    pub async fn alerts(&self, service: &str) -> Vec<AlertRecord> {
        self.alerts.alerts(service).await
    }

    /// Cumulative number of alerts raised for `service`
    pub async fn active_alert_count(&self, service: &str) -> usize {
        self.alerts.active_count(service).await
    }
}
