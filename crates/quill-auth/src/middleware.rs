//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::token::{Identity, TokenManager};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authenticate a request from its headers
///
/// A missing header is `MissingAuthHeader`; a header that is not
/// `Bearer <token>` is `InvalidAuthHeader`; token failures come from
/// [`TokenManager::verify`].
pub fn require_auth(headers: &HeaderMap, tokens: &TokenManager) -> Result<Identity, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingAuthHeader)?;
    let header = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = extract_bearer_token(header)?;
    tokens.verify(token)
}

/// Authentication middleware
///
/// Rejects the request unless it carries a valid bearer token. On success the
/// verified [`Identity`] is added to request extensions for the inner handler.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = match require_auth(request.headers(), &tokens) {
        Ok(identity) => identity,
        Err(e) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            metrics::counter!("quill_auth_rejections_total", "reason" => e.reason()).increment(1);
            return Err(e);
        }
    };

    debug!(
        "Authenticated subject {} ({})",
        identity.subject_id, identity.display_name
    );

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
