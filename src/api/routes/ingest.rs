//! Agent ingestion endpoint

use axum::{Json, body::Bytes, extract::State};

use crate::api::{error::ApiResult, state::ApiState, types::IngestResponse};

/// POST /ingest
///
/// The body is taken raw so that malformed JSON is answered with the same
/// `{"error": ...}` body as any other invalid payload.
pub async fn ingest(State(state): State<ApiState>, body: Bytes) -> ApiResult<Json<IngestResponse>> {
    state.hub.ingest_bytes(&body).await?;
    Ok(Json(IngestResponse { ok: true }))
}
