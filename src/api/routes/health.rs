//! Health check endpoint

use crate::api::types::HealthResponse;
use axum::Json;

/// GET /health
///
/// Liveness probe for the hub itself
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "up".to_string(),
    })
}
