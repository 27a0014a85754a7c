//! Request/Response DTOs

use quill_db::{Comment, Post};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::{Validate, check_length, check_text};

/// Maximum allowed login name length
const MAX_LOGIN_NAME_LENGTH: usize = 64;
/// Maximum allowed display name length
const MAX_DISPLAY_NAME_LENGTH: usize = 64;
/// Minimum password length for new accounts
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_BODY_LENGTH: usize = 10_000;
const MAX_PROMPT_LENGTH: usize = 4_000;
/// Largest page size for list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

fn validate_login_name(login_name: &str) -> Result<(), ApiError> {
    check_length("login_name", login_name, 1, MAX_LOGIN_NAME_LENGTH)?;
    // Only allow alphanumeric characters, underscores, and hyphens
    if !login_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::Validation(
            "login_name can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_password_bytes(password: &str, min: usize) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("password cannot be empty".to_string()));
    }
    if password.len() < min {
        return Err(ApiError::Validation(format!(
            "password must be at least {} characters long",
            min
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Types ====================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login_name: String,
    pub display_name: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_login_name(&self.login_name)?;
        check_text("display_name", &self.display_name, MAX_DISPLAY_NAME_LENGTH)?;
        validate_password_bytes(&self.password, MIN_PASSWORD_LENGTH)
    }
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub login_name: String,
    pub display_name: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login_name: String,
    pub password: String,
}

impl Validate for LoginRequest {
    // Only bounds are checked here; anything else is reported as invalid credentials
    fn validate(&self) -> Result<(), ApiError> {
        check_length("login_name", &self.login_name, 1, MAX_LOGIN_NAME_LENGTH)?;
        validate_password_bytes(&self.password, 1)
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub subject_id: i64,
    pub display_name: String,
    pub expires_in: i64,
}

// ==================== Post Types ====================

/// Create post request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_text("title", &self.title, MAX_TITLE_LENGTH)?;
        check_text("body", &self.body, MAX_BODY_LENGTH)
    }
}

/// Update post request; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.is_none() && self.body.is_none() {
            return Err(ApiError::Validation(
                "at least one of title or body is required".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            check_text("title", title, MAX_TITLE_LENGTH)?;
        }
        if let Some(body) = &self.body {
            check_text("body", body, MAX_BODY_LENGTH)?;
        }
        Ok(())
    }
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            title: post.title,
            body: post.body,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

impl ListQuery {
    /// Offset and limit clamped to sane bounds
    pub fn bounds(&self) -> (i64, i64) {
        (self.offset.max(0), self.limit.clamp(1, MAX_PAGE_SIZE))
    }
}

// ==================== Comment Types ====================

/// Create or replace comment request
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

impl Validate for CommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_text("body", &self.body, MAX_BODY_LENGTH)
    }
}

/// Comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            owner_id: comment.owner_id,
            body: comment.body,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Chat Types ====================

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

impl Validate for ChatRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_text("prompt", &self.prompt, MAX_PROMPT_LENGTH)
    }
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(login_name: &str, display_name: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            login_name: login_name.to_string(),
            display_name: display_name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("alice", "Alice", "pw123456").validate().is_ok());
        assert!(register("", "Alice", "pw123456").validate().is_err());
        assert!(register("al ice", "Alice", "pw123456").validate().is_err());
        assert!(register("alice", "  ", "pw123456").validate().is_err());
        assert!(register("alice", "Alice", "short").validate().is_err());
        assert!(register("alice", "Alice", &"x".repeat(257)).validate().is_err());
        assert!(register(&"a".repeat(65), "Alice", "pw123456").validate().is_err());
    }

    #[test]
    fn test_login_validation_only_checks_bounds() {
        let request = LoginRequest {
            login_name: "not valid!".to_string(),
            password: "x".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = LoginRequest {
            login_name: "alice".to_string(),
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_post_needs_a_field() {
        let empty = UpdatePostRequest {
            title: None,
            body: None,
        };
        assert!(empty.validate().is_err());

        let blank_title = UpdatePostRequest {
            title: Some(" ".to_string()),
            body: None,
        };
        assert!(blank_title.validate().is_err());

        let body_only = UpdatePostRequest {
            title: None,
            body: Some("new body".to_string()),
        };
        assert!(body_only.validate().is_ok());
    }

    #[test]
    fn test_list_query_bounds() {
        let query = ListQuery {
            offset: -5,
            limit: 1000,
        };
        assert_eq!(query.bounds(), (0, MAX_PAGE_SIZE));

        let query = ListQuery {
            offset: 10,
            limit: 0,
        };
        assert_eq!(query.bounds(), (10, 1));
    }
}
