//! HTTP API of the hub
//!
//! Agents push samples to `/ingest`; everything else is a read-only view over
//! the hub's state.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `POST /ingest` - Agent payload ingestion
//! - `GET /services` - Known services, sorted
//! - `GET /metrics/{service}` - Sample history
//! - `GET /status/{service}` - `UP` / `DOWN`
//! - `GET /alerts/{service}` - Alert history
//! - `GET /alerts/active/{service}` - Cumulative alert count
//!
//! Unknown services are answered with empty or zero values, never with an
//! error.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{AlertCountResponse, HealthResponse, IngestResponse, StatusResponse};

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HubConfig;
use crate::util;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8000")
    pub bind_addr: SocketAddr,

    /// Optional token agents must present on `/ingest`
    pub auth_token: Option<String>,

    /// Enable CORS for the dashboard
    pub enable_cors: bool,

    /// Prebuilt dashboard served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: util::default_bind_addr(),
            auth_token: None,
            enable_cors: true,
            static_dir: None,
        }
    }
}

impl From<&HubConfig> for ApiConfig {
    fn from(config: &HubConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            auth_token: config.auth_token.clone(),
            enable_cors: config.enable_cors,
            static_dir: config.static_dir.clone(),
        }
    }
}

/// Build the router with all routes and layers
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    let mut ingest = Router::new().route("/ingest", post(routes::ingest::ingest));

    if let Some(token) = &config.auth_token {
        ingest = ingest.route_layer(axum::middleware::from_fn_with_state(
            token.clone(),
            middleware::auth::require_agent_token,
        ));
    }

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/services", get(routes::services::list_services))
        .route("/metrics/:service", get(routes::metrics::get_metrics))
        .route("/status/:service", get(routes::status::get_status))
        .route("/alerts/:service", get(routes::alerts::get_alerts))
        .route(
            "/alerts/active/:service",
            get(routes::alerts::get_active_count),
        )
        .merge(ingest)
        .with_state(state);

    if let Some(dist_path) = &config.static_dir {
        if dist_path.is_dir() {
            info!("serving dashboard from {}", dist_path.display());
            app = app.fallback_service(ServeDir::new(dist_path).precompressed_gzip());
        } else {
            info!(
                "dashboard directory not found at {}, not serving static files",
                dist_path.display()
            );
        }
    }

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
