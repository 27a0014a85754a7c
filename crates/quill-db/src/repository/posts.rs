//! Post operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewPost, Post, UpdatePost};

use super::Database;

impl Database {
    /// Insert a new post
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (owner_id, title, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post.owner_id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(Post {
            id: result.get("id"),
            owner_id: post.owner_id,
            title: post.title,
            body: post.body,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a post by ID
    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, owner_id, title, body, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List posts, newest first
    pub async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, body, created_at, updated_at
            FROM posts
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update; returns the updated post, or `None` if it no longer exists
    pub async fn update_post(&self, id: i64, update: UpdatePost) -> Result<Option<Post>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title), body = COALESCE(?, body), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.body)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    /// Delete a post and its comments
    pub async fn delete_post(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::account;

    #[tokio::test]
    async fn test_post_lifecycle() {
        let db = Database::in_memory().await.unwrap();
        let owner = account(&db, "alice").await;

        let post = db
            .insert_post(NewPost {
                owner_id: owner.id,
                title: "Hello".to_string(),
                body: "First post".to_string(),
            })
            .await
            .unwrap();

        let fetched = db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.owner_id, owner.id);
        assert_eq!(fetched.title, "Hello");

        let updated = db
            .update_post(
                post.id,
                UpdatePost {
                    title: None,
                    body: Some("Edited".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Hello");
        assert_eq!(updated.body, "Edited");

        assert!(db.delete_post(post.id).await.unwrap());
        assert!(!db.delete_post(post.id).await.unwrap());
        assert!(db.get_post(post.id).await.unwrap().is_none());
        assert!(db.update_post(post.id, UpdatePost::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_posts_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let owner = account(&db, "alice").await;

        for title in ["one", "two", "three"] {
            db.insert_post(NewPost {
                owner_id: owner.id,
                title: title.to_string(),
                body: "body".to_string(),
            })
            .await
            .unwrap();
        }

        let page = db.list_posts(0, 2).await.unwrap();
        let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);

        let rest = db.list_posts(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "one");
    }

    #[tokio::test]
    async fn test_post_requires_existing_owner() {
        let db = Database::in_memory().await.unwrap();

        let result = db
            .insert_post(NewPost {
                owner_id: 4242,
                title: "orphan".to_string(),
                body: "body".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
