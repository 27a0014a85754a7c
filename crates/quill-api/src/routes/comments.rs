//! Comment routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use quill_auth::{Identity, guard_mutation};
use quill_db::NewComment;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{ApiPath, ValidatedJson};
use crate::state::AppState;

use super::types::{CommentRequest, CommentResponse};

/// Fail with 404 unless the post exists
async fn require_post(state: &AppState, post_id: i64) -> Result<(), ApiError> {
    match state.db.get_post(post_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!("Post: {}", post_id))),
    }
}

/// GET /api/v1/posts/{id}/comments
async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    require_post(&state, post_id).await?;
    let comments = state.db.list_comments(post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// POST /api/v1/posts/{id}/comments
async fn create_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(post_id): ApiPath<i64>,
    ValidatedJson(request): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    require_post(&state, post_id).await?;

    let comment = state
        .db
        .insert_comment(NewComment {
            post_id,
            owner_id: identity.subject_id,
            body: request.body,
        })
        .await?;

    info!(
        "Subject {} commented {} on post {}",
        identity.subject_id, comment.id, post_id
    );
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// PUT /api/v1/comments/{id} (owner only)
async fn update_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(request): ValidatedJson<CommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    debug!("Subject {} updating comment {}", identity.subject_id, id);

    let existing = state.db.get_comment(id).await?;
    guard_mutation(&identity, existing)?;

    let comment = state
        .db
        .update_comment(id, &request.body)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment: {}", id)))?;

    Ok(Json(comment.into()))
}

/// DELETE /api/v1/comments/{id} (owner only)
async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = state.db.get_comment(id).await?;
    guard_mutation(&identity, existing)?;

    if !state.db.delete_comment(id).await? {
        return Err(ApiError::NotFound(format!("Comment: {}", id)));
    }

    info!("Subject {} deleted comment {}", identity.subject_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// Public comment routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/posts/{id}/comments", get(list_comments))
}

/// Comment routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/posts/{id}/comments", post(create_comment))
        .route("/api/v1/comments/{id}", put(update_comment))
        .route("/api/v1/comments/{id}", delete(delete_comment))
}
