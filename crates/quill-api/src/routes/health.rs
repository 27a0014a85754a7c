//! Health check endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub chat_backend: String,
    pub chat_available: bool,
}

/// Health check handler
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    metrics::counter!("quill_health_checks_total").increment(1);

    let database_up = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: database unreachable: {}", e);
            false
        }
    };

    // Chat is optional: an unhealthy backend does not degrade the service
    let chat_available = match state.chat.health().await {
        Ok(ready) => ready,
        Err(e) => {
            warn!("Health check: chat backend {} unavailable: {}", state.chat.name(), e);
            false
        }
    };

    let (status, label) = if database_up {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if database_up { "up" } else { "down" }.to_string(),
            chat_backend: state.chat.name().to_string(),
            chat_available,
        }),
    )
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
