//! Account operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Account, NewAccount};
use crate::repository::Database;

impl Database {
    /// Insert a new account
    ///
    /// The UNIQUE constraint on `login_name` surfaces as `DbError::Duplicate`.
    pub async fn insert_account(&self, account: NewAccount) -> Result<Account, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (login_name, display_name, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.login_name)
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_insert(e, format!("Account '{}' already exists", account.login_name))
        })?;

        let id: i64 = result.get("id");

        Ok(Account {
            id,
            login_name: account.login_name,
            display_name: account.display_name,
            password_hash: account.password_hash,
            created_at: now,
        })
    }

    /// Get an account by login name
    pub async fn get_account_by_login(&self, login_name: &str) -> Result<Option<Account>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, login_name, display_name, password_hash, created_at
            FROM accounts
            WHERE login_name = ?
            "#,
        )
        .bind(login_name)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Account::try_from(&row).map_err(DbError::from)).transpose()
    }
}
