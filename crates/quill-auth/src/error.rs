//! Authentication error types

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login name already in use")]
    DuplicateLogin,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Database error: {0}")]
    Database(#[from] quill_db::DbError),
}

impl AuthError {
    /// Short label used for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::DuplicateLogin => "duplicate_login",
            AuthError::EmptyPassword => "empty_password",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::MissingAuthHeader => "missing_header",
            AuthError::InvalidAuthHeader => "malformed_header",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::Signing(_) => "signing",
            AuthError::Task(_) => "task",
            AuthError::Database(_) => "database",
        }
    }

    /// HTTP status, error code and client-safe message
    pub fn status_code_message(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Invalid credentials")
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Token expired"),
            AuthError::MissingAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Missing authorization header",
            ),
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Invalid authorization header format",
            ),
            AuthError::DuplicateLogin => {
                (StatusCode::CONFLICT, "DUPLICATE_LOGIN", "Login name already in use")
            }
            AuthError::EmptyPassword => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Password must not be empty",
            ),
            AuthError::PasswordHash(_)
            | AuthError::Signing(_)
            | AuthError::Task(_)
            | AuthError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication failure: {}", self);
        }

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
