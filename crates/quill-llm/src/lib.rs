//! Quill LLM Chat Client
//!
//! This crate forwards chat prompts to an external LLM inference service,
//! or answers them locally when no service is configured.

pub mod backend;
pub mod client;
pub mod error;
pub mod mock;

pub use backend::{ChatBackend, ChatReply};
pub use client::{LlmClient, LlmClientConfig};
pub use error::LlmError;
pub use mock::MockChatBackend;

use std::sync::Arc;

/// Build the chat backend: HTTP when an endpoint is configured, mock otherwise
pub fn build_backend(config: Option<LlmClientConfig>) -> Result<Arc<dyn ChatBackend>, LlmError> {
    match config {
        Some(config) => Ok(Arc::new(LlmClient::new(config)?)),
        None => {
            tracing::warn!("No LLM endpoint configured, chat runs in mock mode");
            Ok(Arc::new(MockChatBackend::new()))
        }
    }
}
