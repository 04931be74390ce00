//! API shared state

use std::sync::Arc;

use crate::Hub;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// The ingestion and service-status core
    pub hub: Arc<Hub>,
}

impl ApiState {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}
