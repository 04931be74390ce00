//! API error types and conversions

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::ingest::IngestError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
///
/// Unknown services are deliberately absent: every query answers them with an
/// empty or zero value instead.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or missing required field
    InvalidPayload(String),

    /// The registry could not be persisted
    PersistenceFailure(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PersistenceFailure(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidPayload(_) => {
                warn!("rejected payload: {err}");
                ApiError::InvalidPayload(err.to_string())
            }
            IngestError::Persistence(_) => {
                error!("ingestion failed: {err}");
                ApiError::PersistenceFailure(err.to_string())
            }
        }
    }
}
