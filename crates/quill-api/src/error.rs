//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quill_auth::GuardError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] quill_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] quill_auth::AuthError),

    #[error("LLM error: {0}")]
    Llm(#[from] quill_llm::LlmError),
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            GuardError::Forbidden(_) => ApiError::Forbidden,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(e) => return e.into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Not permitted to modify this resource".to_string(),
            ),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                internal()
            }
            ApiError::Llm(e) => match e {
                quill_llm::LlmError::Unavailable => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "LLM_UNAVAILABLE",
                    "LLM backend is not ready".to_string(),
                ),
                other => {
                    error!("LLM backend error: {}", other);
                    (
                        StatusCode::BAD_GATEWAY,
                        "LLM_ERROR",
                        "LLM backend failed to answer".to_string(),
                    )
                }
            },
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal error".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_guard_errors_map_to_404_and_403() {
        let (status, body) = render(GuardError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, body) = render(GuardError::Forbidden(quill_auth::Forbidden).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_internal_details_not_echoed() {
        let (status, body) =
            render(quill_db::DbError::Duplicate("stack trace at line 42".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal error");

        let (status, body) = render(ApiError::Llm(quill_llm::LlmError::UpstreamError {
            status: 500,
            message: "CUDA out of memory".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.to_string().contains("CUDA"));
    }

    #[tokio::test]
    async fn test_auth_errors_keep_their_mapping() {
        let (status, body) = render(quill_auth::AuthError::DuplicateLogin.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_LOGIN");

        let (status, _) = render(quill_auth::AuthError::TokenExpired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
