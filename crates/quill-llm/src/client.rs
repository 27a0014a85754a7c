//! HTTP client for the LLM inference service

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{ChatBackend, ChatReply};
use crate::error::LlmError;

/// LLM client configuration
#[derive(Clone, Debug)]
pub struct LlmClientConfig {
    /// Base URL of the inference service
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Chat request body sent to the inference service
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// LLM inference API client
pub struct LlmClient {
    base_url: String,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: LlmClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let base_url = config.url.trim_end_matches('/').to_string();
        info!("Created LLM client for {}", base_url);

        Ok(Self { base_url, client })
    }

    fn map_transport(err: reqwest::Error) -> LlmError {
        if err.is_connect() || err.is_timeout() {
            warn!("LLM backend unreachable: {}", err);
            LlmError::Unavailable
        } else {
            LlmError::Http(err)
        }
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn chat(&self, prompt: &str) -> Result<ChatReply, LlmError> {
        let url = format!("{}/llm/chat", self.base_url);
        debug!("Forwarding prompt ({} chars) to {}", prompt.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(Self::map_transport)?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(LlmError::Unavailable);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ChatReply>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    async fn health(&self) -> Result<bool, LlmError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(Self::map_transport)?;
        Ok(response.status().is_success())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
