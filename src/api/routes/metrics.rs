//! Metric history endpoint

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{MetricSample, api::state::ApiState};

/// GET /metrics/:service
///
/// Full sample history in arrival order, empty for unknown services
pub async fn get_metrics(
    State(state): State<ApiState>,
    Path(service): Path<String>,
) -> Json<Vec<MetricSample>> {
    Json(state.hub.history(&service).await)
}
