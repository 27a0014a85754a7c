//! Comment operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Comment, NewComment};

use super::Database;

impl Database {
    /// Insert a new comment
    pub async fn insert_comment(&self, comment: NewComment) -> Result<Comment, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, owner_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.owner_id)
        .bind(&comment.body)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(Comment {
            id: result.get("id"),
            post_id: comment.post_id,
            owner_id: comment.owner_id,
            body: comment.body,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a comment by ID
    pub async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, post_id, owner_id, body, created_at, updated_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Comment::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List the comments of a post, oldest first
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, owner_id, body, created_at, updated_at
            FROM comments
            WHERE post_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Comment::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Replace a comment body; returns the updated comment, or `None` if it no longer exists
    pub async fn update_comment(&self, id: i64, body: &str) -> Result<Option<Comment>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET body = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(body)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_comment(id).await
    }

    /// Delete a comment
    pub async fn delete_comment(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPost;
    use crate::repository::test_support::account;

    #[tokio::test]
    async fn test_comments_follow_post_lifetime() {
        let db = Database::in_memory().await.unwrap();
        let author = account(&db, "alice").await;
        let reader = account(&db, "bob").await;

        let post = db
            .insert_post(NewPost {
                owner_id: author.id,
                title: "t".to_string(),
                body: "b".to_string(),
            })
            .await
            .unwrap();

        let first = db
            .insert_comment(NewComment {
                post_id: post.id,
                owner_id: reader.id,
                body: "nice".to_string(),
            })
            .await
            .unwrap();
        db.insert_comment(NewComment {
            post_id: post.id,
            owner_id: author.id,
            body: "thanks".to_string(),
        })
        .await
        .unwrap();

        let listed = db.list_comments(post.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].owner_id, reader.id);

        let edited = db.update_comment(first.id, "very nice").await.unwrap().unwrap();
        assert_eq!(edited.body, "very nice");

        // Deleting the post cascades to its comments
        assert!(db.delete_post(post.id).await.unwrap());
        assert!(db.get_comment(first.id).await.unwrap().is_none());
        assert!(db.list_comments(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_comment() {
        let db = Database::in_memory().await.unwrap();
        assert!(!db.delete_comment(1).await.unwrap());
        assert!(db.update_comment(1, "x").await.unwrap().is_none());
    }
}
