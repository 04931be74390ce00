//! Durable registry of known services
//!
//! The registry is the only piece of hub state that survives a restart. A
//! service is added the first time it reports and is never removed, so a
//! service that went quiet still shows up (as `DOWN`) after the hub restarts.
//!
//! ## Write path
//!
//! Registrations are write-through: every new identifier causes the full set
//! to be persisted before the registration is acknowledged. Writers are
//! serialized behind a gate, while readers only contend for the short swap of
//! the in-memory set after a successful write.

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;

pub use backend::RegistryBackend;
pub use error::{RegistryError, RegistryResult};
pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time;
use tracing::{debug, error, info, warn};

/// How many times a registry write is attempted before giving up
const SAVE_ATTEMPTS: u32 = 3;

/// Upper bound for a single write attempt
const SAVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Base delay between attempts (multiplied by the attempt number)
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Append-only set of service identifiers backed by stable storage
pub struct ServiceRegistry {
    services: RwLock<BTreeSet<String>>,
    write_gate: Mutex<()>,
    backend: Box<dyn RegistryBackend>,
}

impl ServiceRegistry {
    /// Load the registry from `backend`
    ///
    /// An empty or absent store yields an empty registry. A store that exists
    /// but cannot be read is an error.
    pub async fn load(backend: Box<dyn RegistryBackend>) -> RegistryResult<Self> {
        let services = backend.load().await?;
        info!(
            "loaded {} known services from {}",
            services.len(),
            backend.describe()
        );

        Ok(Self {
            services: RwLock::new(services),
            write_gate: Mutex::new(()),
            backend,
        })
    }

    /// Empty registry that only lives as long as the process
    pub fn in_memory() -> Self {
        Self {
            services: RwLock::new(BTreeSet::new()),
            write_gate: Mutex::new(()),
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Register a service identifier
    ///
    /// Returns `Ok(true)` if the identifier was new. If persisting fails, the
    /// identifier is not added, so a later call retries the registration.
    pub async fn register(&self, id: &str) -> RegistryResult<bool> {
        if self.contains(id).await {
            return Ok(false);
        }

        let _gate = self.write_gate.lock().await;

        // another writer may have added it while we waited for the gate
        let mut candidate = self.services.read().await.clone();
        if !candidate.insert(id.to_string()) {
            return Ok(false);
        }

        self.persist(&candidate).await?;
        *self.services.write().await = candidate;

        debug!("registered new service {id}");
        Ok(true)
    }

    /// All known identifiers in lexicographic order
    pub async fn list(&self) -> Vec<String> {
        self.services.read().await.iter().cloned().collect()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.services.read().await.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }

    async fn persist(&self, services: &BTreeSet<String>) -> RegistryResult<()> {
        let mut attempt = 1;
        loop {
            let result = match time::timeout(SAVE_TIMEOUT, self.backend.save(services)).await {
                Ok(result) => result,
                Err(_) => Err(RegistryError::Timeout(SAVE_TIMEOUT)),
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) if attempt < SAVE_ATTEMPTS => {
                    warn!("registry write attempt {attempt}/{SAVE_ATTEMPTS} failed: {e}");
                    time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "giving up on registry write to {} after {SAVE_ATTEMPTS} attempts: {e}",
                        self.backend.describe()
                    );
                    return Err(e);
                }
            }
        }
    }
}
