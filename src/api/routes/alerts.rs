//! Alert history endpoints

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    alerts::AlertRecord,
    api::{state::ApiState, types::AlertCountResponse},
};

/// GET /alerts/:service
pub async fn get_alerts(
    State(state): State<ApiState>,
    Path(service): Path<String>,
) -> Json<Vec<AlertRecord>> {
    Json(state.hub.alerts(&service).await)
}

/// GET /alerts/active/:service
///
/// Cumulative count of every alert ever raised, alerts are never resolved
pub async fn get_active_count(
    State(state): State<ApiState>,
    Path(service): Path<String>,
) -> Json<AlertCountResponse> {
    Json(AlertCountResponse {
        count: state.hub.active_alert_count(&service).await,
    })
}
