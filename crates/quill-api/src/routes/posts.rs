//! Post routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use quill_auth::{Identity, guard_mutation};
use quill_db::{NewPost, UpdatePost};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::state::AppState;

use super::types::{CreatePostRequest, ListQuery, PostResponse, UpdatePostRequest};

fn post_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Post: {}", id))
}

/// GET /api/v1/posts
async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let (offset, limit) = query.bounds();
    let posts = state.db.list_posts(offset, limit).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/v1/posts/{id}
async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.db.get_post(id).await?.ok_or_else(|| post_not_found(id))?;
    Ok(Json(post.into()))
}

/// POST /api/v1/posts
async fn create_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = state
        .db
        .insert_post(NewPost {
            owner_id: identity.subject_id,
            title: request.title,
            body: request.body,
        })
        .await?;

    info!("Subject {} created post {}", identity.subject_id, post.id);
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// PUT /api/v1/posts/{id} (owner only)
async fn update_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    debug!("Subject {} updating post {}", identity.subject_id, id);

    let existing = state.db.get_post(id).await?;
    guard_mutation(&identity, existing)?;

    let post = state
        .db
        .update_post(
            id,
            UpdatePost {
                title: request.title,
                body: request.body,
            },
        )
        .await?
        // Deleted between the ownership check and the write
        .ok_or_else(|| post_not_found(id))?;

    info!("Subject {} updated post {}", identity.subject_id, id);
    Ok(Json(post.into()))
}

/// DELETE /api/v1/posts/{id} (owner only)
async fn delete_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    debug!("Subject {} deleting post {}", identity.subject_id, id);

    let existing = state.db.get_post(id).await?;
    guard_mutation(&identity, existing)?;

    if state.db.delete_post(id).await? {
        info!("Subject {} deleted post {}", identity.subject_id, id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(post_not_found(id))
    }
}

/// Public post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/posts", get(list_posts))
        .route("/api/v1/posts/{id}", get(get_post))
}

/// Post routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/posts", post(create_post))
        .route("/api/v1/posts/{id}", put(update_post))
        .route("/api/v1/posts/{id}", delete(delete_post))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{TestApp, test_app};
    use axum::http::StatusCode;
    use quill_db::NewPost;
    use serde_json::json;

    /// Create accounts 1..=n so tests can refer to fixed IDs
    async fn seed_accounts(app: &TestApp, n: i64) {
        for i in 1..=n {
            let account = app.account(&format!("user{}", i)).await;
            assert_eq!(account.id, i);
        }
    }

    async fn seed_post(app: &TestApp, owner_id: i64) -> i64 {
        app.state
            .db
            .insert_post(NewPost {
                owner_id,
                title: "Owned".to_string(),
                body: "Original".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_read_post() {
        let app = test_app().await;
        seed_accounts(&app, 1).await;
        let token = app.token_for(1);

        let (status, created) = app
            .request(
                "POST",
                "/api/v1/posts",
                Some(&token),
                Some(json!({"title": "Hello", "body": "World"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["owner_id"], 1);
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = app
            .request("GET", &format!("/api/v1/posts/{}", id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Hello");

        let (status, listed) = app.request("GET", "/api/v1/posts?limit=5", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_and_query_are_validation_errors() {
        let app = test_app().await;
        seed_accounts(&app, 1).await;

        let (status, body) = app.request("GET", "/api/v1/posts/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid path parameter");

        let (status, body) = app
            .request("PUT", "/api/v1/posts/abc", Some(&app.token_for(1)), Some(json!({"title": "x"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = app.request("GET", "/api/v1/posts?limit=abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid query string");
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let app = test_app().await;

        let (status, _) = app
            .request(
                "POST",
                "/api/v1/posts",
                None,
                Some(json!({"title": "Hello", "body": "World"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let app = test_app().await;
        seed_accounts(&app, 9).await;
        let post_id = seed_post(&app, 7).await;

        let (status, body) = app
            .request(
                "DELETE",
                &format!("/api/v1/posts/{}", post_id),
                Some(&app.token_for(9)),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        // Nothing was deleted
        let post = app.state.db.get_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.owner_id, 7);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_leaves_post_untouched() {
        let app = test_app().await;
        seed_accounts(&app, 9).await;
        let post_id = seed_post(&app, 7).await;

        let (status, _) = app
            .request(
                "PUT",
                &format!("/api/v1/posts/{}", post_id),
                Some(&app.token_for(9)),
                Some(json!({"body": "Hijacked"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let post = app.state.db.get_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.body, "Original");
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found_before_ownership() {
        let app = test_app().await;
        seed_accounts(&app, 9).await;
        let token = app.token_for(9);

        let (status, body) = app
            .request(
                "PUT",
                "/api/v1/posts/99999",
                Some(&token),
                Some(json!({"title": "Anything"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = app
            .request("DELETE", "/api/v1/posts/99999", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_owner_can_update_and_delete() {
        let app = test_app().await;
        seed_accounts(&app, 7).await;
        let post_id = seed_post(&app, 7).await;
        let token = app.token_for(7);
        let uri = format!("/api/v1/posts/{}", post_id);

        let (status, updated) = app
            .request("PUT", &uri, Some(&token), Some(json!({"title": "Renamed"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Renamed");
        assert_eq!(updated["body"], "Original");

        let (status, body) = app.request("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _) = app.request("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_expired_token_rejected_on_mutation() {
        let app = test_app().await;
        seed_accounts(&app, 7).await;
        let post_id = seed_post(&app, 7).await;
        let stale = app
            .state
            .tokens
            .issue_at(7, "user-7", chrono::Utc::now() - chrono::Duration::hours(2))
            .unwrap();

        let (status, body) = app
            .request("DELETE", &format!("/api/v1/posts/{}", post_id), Some(&stale), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Token expired");
        assert!(app.state.db.get_post(post_id).await.unwrap().is_some());
    }
}
