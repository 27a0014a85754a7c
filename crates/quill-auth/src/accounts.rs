//! Account registration and login

use quill_db::{Database, DbError, NewAccount};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::token::TokenManager;

/// Valid Argon2 hash that no password matches, verified when the login name is
/// unknown so that both failure paths cost one hash computation
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub subject_id: i64,
    pub display_name: String,
}

/// Registration and login on top of the account store
#[derive(Clone)]
pub struct AccountService {
    db: Database,
    tokens: Arc<TokenManager>,
}

impl AccountService {
    pub fn new(db: Database, tokens: Arc<TokenManager>) -> Self {
        Self { db, tokens }
    }

    /// Register a new account and return its ID
    pub async fn register(
        &self,
        login_name: &str,
        display_name: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        // The UNIQUE constraint still decides concurrent registrations
        if self.db.get_account_by_login(login_name).await?.is_some() {
            debug!("Registration refused, login name taken: {}", login_name);
            return Err(AuthError::DuplicateLogin);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))??;

        let account = self
            .db
            .insert_account(NewAccount {
                login_name: login_name.to_string(),
                display_name: display_name.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => AuthError::DuplicateLogin,
                other => AuthError::Database(other),
            })?;

        info!("Registered account {} ({})", account.login_name, account.id);
        Ok(account.id)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown login names and wrong passwords both yield `InvalidCredentials`.
    pub async fn login(&self, login_name: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let account = self.db.get_account_by_login(login_name).await?;

        let hash = account
            .as_ref()
            .map(|a| a.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password = password.to_string();
        let password_valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))?;

        let account = match (account, password_valid) {
            (Some(account), true) => account,
            _ => {
                warn!("Failed login for {}", login_name);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(account.id, &account.display_name)?;
        info!("Account {} logged in", account.login_name);

        Ok(LoginOutcome {
            token,
            subject_id: account.id,
            display_name: account.display_name,
        })
    }
}
