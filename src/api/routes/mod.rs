//! Route handlers

pub mod alerts;
pub mod health;
pub mod ingest;
pub mod metrics;
pub mod services;
pub mod status;
