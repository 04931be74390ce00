//! Per-service in-memory history
//!
//! Each service owns its own lock, so appends for different services never
//! wait on each other, and appends for the same service are applied in the
//! order they acquire that lock. The outer map is only write-locked the first
//! time a service shows up.
//!
//! History is volatile: everything here is gone after a restart. By default
//! it also grows without bound; a retention cap turns each history into a
//! ring buffer that drops the oldest entries first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::MetricSample;

/// Ordered metric history of every service
pub type MetricsStore = ServiceLog<MetricSample>;

type Entries<T> = Arc<RwLock<VecDeque<T>>>;

/// Append-only, per-service ordered log
#[derive(Debug)]
pub struct ServiceLog<T> {
    services: RwLock<HashMap<String, Entries<T>>>,
    retention: Option<usize>,
}

impl<T: Clone> ServiceLog<T> {
    /// Unbounded log
    pub fn new() -> Self {
        Self::with_retention(None)
    }

    /// Log keeping at most `retention` entries per service
    ///
    /// `None` or `Some(0)` means unbounded.
    pub fn with_retention(retention: Option<usize>) -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            retention: retention.filter(|&limit| limit > 0),
        }
    }

    /// Append `item` to the end of `service`'s history
    pub async fn append(&self, service: &str, item: T) {
        self.writer(service).await.push(item);
    }

    /// Exclusive write access to `service`'s history
    ///
    /// Other appends for the same service wait until the writer is dropped.
    pub async fn writer(&self, service: &str) -> ServiceWriter<T> {
        let entries = self.entries_for(service).await;
        ServiceWriter {
            entries: entries.write_owned().await,
            retention: self.retention,
        }
    }

    /// Full history of `service` in append order
    ///
    /// Unknown services have an empty history.
    pub async fn history(&self, service: &str) -> Vec<T> {
        match self.existing(service).await {
            Some(entries) => entries.read().await.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Most recently appended entry
    pub async fn latest(&self, service: &str) -> Option<T> {
        let entries = self.existing(service).await?;
        let entries = entries.read().await;
        entries.back().cloned()
    }

    /// Number of entries currently held for `service`
    pub async fn count(&self, service: &str) -> usize {
        match self.existing(service).await {
            Some(entries) => entries.read().await.len(),
            None => 0,
        }
    }

    async fn existing(&self, service: &str) -> Option<Entries<T>> {
        self.services.read().await.get(service).cloned()
    }

    async fn entries_for(&self, service: &str) -> Entries<T> {
        if let Some(entries) = self.existing(service).await {
            return entries;
        }

        self.services
            .write()
            .await
            .entry(service.to_string())
            .or_default()
            .clone()
    }
}

/// Write guard over one service's history, see [`ServiceLog::writer`]
pub struct ServiceWriter<T> {
    entries: OwnedRwLockWriteGuard<VecDeque<T>>,
    retention: Option<usize>,
}

impl<T> ServiceWriter<T> {
    pub fn push(&mut self, item: T) {
        self.entries.push_back(item);
        if let Some(limit) = self.retention {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }
}

impl<T: Clone> Default for ServiceLog<T> {
    fn default() -> Self {
        Self::new()
    }
}
