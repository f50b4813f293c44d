//! Ollama Provider Implementation
//!
//! Talks to an Ollama-compatible `/api/chat` endpoint. Any server that
//! answers with one of the shapes in [`crate::response`] works, which covers
//! OpenAI-compatible proxies as well.
//!
//! A failed call is reported once, without retry; the workflow then takes
//! its deterministic path.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use tenderline_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "gemma3:1b")
//!     .with_timeout(Duration::from_secs(60));
//! ```

use crate::response::ChatResponse;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tenderline_domain::traits::{ChatProvider, ChatRequest};
use tenderline_domain::LlmError;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama chat provider
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for the chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "gemma3:1b", "llama3")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a new Ollama provider on the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.endpoint)
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    /// Send a system + user prompt and return the normalized content
    ///
    /// # Errors
    ///
    /// - `Timeout` if the server does not answer in time
    /// - `Communication` if the server is unreachable or returns an error status
    /// - `ModelNotAvailable` on HTTP 404
    /// - `InvalidResponse` if no known shape with content is found
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_url())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, text)));
        }

        debug!(model = %self.model, bytes = text.len(), "chat response received");
        ChatResponse::from_json(&text)?.into_content()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
