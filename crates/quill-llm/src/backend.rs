//! Chat backend trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Reply produced for a chat prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub time_ms: u64,
}

/// Chat backend trait
///
/// Implementations answer a single prompt; no conversation state is kept.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Answer a prompt
    async fn chat(&self, prompt: &str) -> Result<ChatReply, LlmError>;

    /// Whether the backend is ready to answer
    async fn health(&self) -> Result<bool, LlmError>;

    /// Short name for logs and health output
    fn name(&self) -> &'static str;
}
