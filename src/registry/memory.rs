//! In-memory registry backend (no persistence)
//!
//! Useful for tests and throwaway runs. Everything is lost on restart, which
//! defeats the point of the registry in production.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use super::backend::RegistryBackend;
use super::error::RegistryResult;

/// Registry backend that keeps the "persisted" set in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<BTreeSet<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted set, as if loaded from a previous run
    pub fn with_services<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            saved: Mutex::new(services.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl RegistryBackend for MemoryBackend {
    async fn load(&self) -> RegistryResult<BTreeSet<String>> {
        Ok(self.saved.lock().await.clone())
    }

    async fn save(&self, services: &BTreeSet<String>) -> RegistryResult<()> {
        trace!("in-memory registry backend: saving {} services", services.len());
        *self.saved.lock().await = services.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
