//! Application state

use quill_auth::{AccountService, TokenManager};
use quill_db::Database;
use quill_llm::ChatBackend;
use std::sync::Arc;

/// Prometheus handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub accounts: AccountService,
    pub tokens: Arc<TokenManager>,
    pub chat: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(db: Database, tokens: Arc<TokenManager>, chat: Arc<dyn ChatBackend>) -> Self {
        let accounts = AccountService::new(db.clone(), tokens.clone());
        Self {
            db,
            accounts,
            tokens,
            chat,
        }
    }
}
