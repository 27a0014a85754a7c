//! Registration, login and identity routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use quill_auth::{AuthError, Identity};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    debug!("Registration attempt for {}", request.login_name);

    let id = state
        .accounts
        .register(&request.login_name, &request.display_name, &request.password)
        .await?;

    metrics::counter!("quill_registrations_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            login_name: request.login_name,
            display_name: request.display_name,
        }),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    debug!("Login attempt for {}", request.login_name);

    let outcome = match state.accounts.login(&request.login_name, &request.password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let label = if matches!(e, AuthError::InvalidCredentials) { "rejected" } else { "error" };
            metrics::counter!("quill_logins_total", "outcome" => label).increment(1);
            return Err(e.into());
        }
    };

    metrics::counter!("quill_logins_total", "outcome" => "success").increment(1);

    Ok(Json(LoginResponse {
        token: outcome.token,
        subject_id: outcome.subject_id,
        display_name: outcome.display_name,
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

/// GET /api/v1/auth/me
async fn me(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}

/// Public auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
}

/// Auth routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/v1/auth/me", get(me))
}
