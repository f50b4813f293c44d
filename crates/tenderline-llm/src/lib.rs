//! Tenderline LLM Provider Layer
//!
//! Implementations of the `ChatProvider` trait from `tenderline-domain`.
//! The same provider serves document generation and winner selection.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Ollama-compatible `/api/chat` endpoint
//!
//! Provider replies come in several shapes; [`response::ChatResponse`]
//! normalizes all of them in one place.
//!
//! # Examples
//!
//! ```
//! use tenderline_domain::traits::ChatProvider;
//! use tenderline_domain::ChatRequest;
//! use tenderline_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.chat(&ChatRequest::new("system", "user")).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod response;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tenderline_domain::traits::{ChatProvider, ChatRequest};

pub use ollama::OllamaProvider;
pub use response::ChatResponse;
pub use tenderline_domain::LlmError;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(LlmError),
}

/// Mock chat provider for deterministic testing
///
/// Returns pre-configured content without making any network calls.
/// Responses are keyed by user prompt; unmatched prompts get the default.
///
/// # Examples
///
/// ```
/// use tenderline_domain::traits::ChatProvider;
/// use tenderline_domain::ChatRequest;
/// use tenderline_llm::MockProvider;
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// let request = ChatRequest::new("sys", "prompt1");
/// assert_eq!(provider.chat(&request).await.unwrap(), "response1");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default: Scripted,
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Scripted::Reply(response.into()))
    }

    /// Create a provider that fails every call, as if unreachable
    pub fn unreachable() -> Self {
        Self::with_default(Scripted::Fail(LlmError::Communication(
            "connection refused".to_string(),
        )))
    }

    /// Create a provider that fails every call with the given error
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Scripted::Fail(error))
    }

    fn with_default(default: Scripted) -> Self {
        Self {
            default,
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Wait `delay` before answering each call, like a slow model
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given user prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Scripted::Reply(response.into()));
    }

    /// Configure to return an error for a specific user prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(
            prompt.into(),
            Scripted::Fail(LlmError::Communication("Mock error".to_string())),
        );
    }

    /// Get the number of times chat was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<ChatRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        lock(&self.requests).push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = lock(&self.responses)
            .get(&request.user_prompt)
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        match scripted {
            Scripted::Reply(content) => Ok(content),
            Scripted::Fail(error) => Err(error),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// A poisoned mock only means another test thread panicked mid-call
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> ChatRequest {
        ChatRequest::new("system", user)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.chat(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.chat(&request("hello")).await.unwrap(), "world");
        assert_eq!(provider.chat(&request("foo")).await.unwrap(), "bar");
        assert_eq!(
            provider.chat(&request("unknown")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_records_requests() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);
        assert!(provider.last_request().is_none());

        provider.chat(&request("prompt1")).await.unwrap();
        provider.chat(&request("prompt2")).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_request().unwrap().user_prompt, "prompt2");
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.chat(&request("bad prompt")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_unreachable() {
        let provider = MockProvider::unreachable();
        assert!(provider.chat(&request("anything")).await.is_err());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_delay() {
        let provider = MockProvider::new("late").with_delay(Duration::from_secs(30));

        let started = tokio::time::Instant::now();
        assert_eq!(provider.chat(&request("slow")).await.unwrap(), "late");
        assert!(started.elapsed() >= Duration::from_secs(30));

        let early =
            tokio::time::timeout(Duration::from_secs(5), provider.chat(&request("slow"))).await;
        assert!(early.is_err());
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.chat(&request("test")).await.unwrap();

        // Both should share the same call log due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
