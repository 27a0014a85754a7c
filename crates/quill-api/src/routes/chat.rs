//! Chat route

use axum::{Extension, Json, Router, extract::State, routing::post};
use quill_auth::Identity;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{ChatRequest, ChatResponse};

/// POST /api/v1/chat
async fn chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    debug!(
        "Subject {} sent a {} character prompt to {} backend",
        identity.subject_id,
        request.prompt.chars().count(),
        state.chat.name()
    );

    let reply = state.chat.chat(&request.prompt).await.map_err(|e| {
        warn!("Chat request failed: {}", e);
        e
    })?;

    metrics::histogram!("quill_chat_duration_ms").record(reply.time_ms as f64);

    Ok(Json(ChatResponse {
        response: reply.response,
        time_ms: reply.time_ms,
    }))
}

/// Chat routes (all require a bearer token)
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/chat", post(chat))
}
