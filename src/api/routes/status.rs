//! Service status endpoint

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{state::ApiState, types::StatusResponse};

/// GET /status/:service
///
/// `UP` if the service reported within the freshness window, `DOWN` otherwise
/// (including services that never reported)
pub async fn get_status(
    State(state): State<ApiState>,
    Path(service): Path<String>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.hub.status(&service).await,
    })
}
