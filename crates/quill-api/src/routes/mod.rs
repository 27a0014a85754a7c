//! API routes

mod auth;
mod chat;
mod comments;
mod health;
pub mod metrics;
mod posts;
pub mod types;

use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn_with_state};
use quill_auth::auth_middleware;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Request bodies larger than this are rejected before deserialization
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main router
///
/// Routes that need an identity are grouped under the bearer-token
/// middleware; everything else is public.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(posts::protected_routes())
        .merge(comments::protected_routes())
        .merge(chat::routes())
        .route_layer(from_fn_with_state(state.tokens.clone(), auth_middleware));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(posts::routes())
        .merge(comments::routes())
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
