//! Service listing endpoint

use axum::{Json, extract::State};

use crate::api::state::ApiState;

/// GET /services
///
/// All services that ever reported, sorted
pub async fn list_services(State(state): State<ApiState>) -> Json<Vec<String>> {
    Json(state.hub.services().await)
}
