//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Parse a stored RFC3339 timestamp, falling back to the current time
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub login_name: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New account (for insertion)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
}

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New post (for insertion)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: i64,
    pub title: String,
    pub body: String,
}

/// Partial post update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New comment (for insertion)
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub owner_id: i64,
    pub body: String,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&SqliteRow> for Account {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.try_get("id")?,
            login_name: row.try_get("login_name")?,
            display_name: row.try_get("display_name")?,
            password_hash: row.try_get("password_hash")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&SqliteRow> for Post {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&SqliteRow> for Comment {
    type Error = sqlx::Error;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            owner_id: row.try_get("owner_id")?,
            body: row.try_get("body")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?),
        })
    }
}
