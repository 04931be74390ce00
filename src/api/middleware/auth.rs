//! Agent token check for `/ingest`
//!
//! Only installed when the hub is configured with a token. Otherwise the
//! `Authorization` header agents send is passed through untouched.

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Reject ingestion requests whose bearer token does not match `agent_token`
pub async fn require_agent_token(
    State(agent_token): State<String>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AgentTokenError> {
    let presented = bearer_token(request.headers())?;

    if !token_matches(presented, &agent_token) {
        warn!("rejected ingestion with a wrong agent token");
        return Err(AgentTokenError::Mismatch);
    }

    Ok(next.run(request).await)
}

/// Constant-time token comparison
fn token_matches(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();

    if presented.len() != expected.len() {
        return false;
    }

    presented.ct_eq(expected).into()
}

/// Extract the token of an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AgentTokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AgentTokenError::Missing)?
        .to_str()
        .map_err(|_| AgentTokenError::Malformed)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token.trim()),
        _ => Err(AgentTokenError::Malformed),
    }
}

#[derive(Debug, PartialEq)]
pub enum AgentTokenError {
    Missing,
    Malformed,
    Mismatch,
}

impl IntoResponse for AgentTokenError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AgentTokenError::Missing => (StatusCode::UNAUTHORIZED, "missing agent token"),
            AgentTokenError::Malformed => (
                StatusCode::UNAUTHORIZED,
                "malformed Authorization header (expected: Bearer <token>)",
            ),
            AgentTokenError::Mismatch => (StatusCode::FORBIDDEN, "agent token not accepted"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
