//! Offline chat backend

use async_trait::async_trait;
use std::time::Instant;

use crate::backend::{ChatBackend, ChatReply};
use crate::error::LlmError;

/// Answers every prompt with a canned reply that quotes it back
#[derive(Debug, Default, Clone)]
pub struct MockChatBackend;

impl MockChatBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn chat(&self, prompt: &str) -> Result<ChatReply, LlmError> {
        let started = Instant::now();
        let response = format!("[mock] You asked: {}", prompt.trim());
        Ok(ChatReply {
            response,
            time_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn health(&self) -> Result<bool, LlmError> {
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
