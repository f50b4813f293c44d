//! Normalization of chat-completion response shapes
//!
//! Providers disagree on where the completion text lives. Each known shape
//! is one variant; [`ChatResponse::into_content`] is the single place that
//! turns any of them into text, and it fails explicitly when there is none.

use serde::Deserialize;
use tenderline_domain::LlmError;

/// A chat message as returned by Ollama and OpenAI-style APIs
///
/// `content` is required: a message with null or absent content does not
/// match, so the next shape is tried.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Message text
    pub content: String,
}

/// One entry of an OpenAI-style `choices` array
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message
    pub message: ResponseMessage,
}

/// One entry of an `output` / `results` / `result` array
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    /// Item text
    pub content: String,
}

/// Known response shapes, tried in order
///
/// A shape only matches when its content field holds a string, so a body
/// carrying several shapes resolves to the first one with text in it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    /// `{"message": {"content": ...}}` (Ollama `/api/chat`)
    Message {
        /// The reply message
        message: ResponseMessage,
    },
    /// `{"choices": [{"message": {"content": ...}}]}` (OpenAI-compatible)
    Choices {
        /// Candidate completions
        choices: Vec<Choice>,
    },
    /// `{"output": [{"content": ...}]}`
    Output {
        /// Output items
        output: Vec<ContentItem>,
    },
    /// `{"results": [{"content": ...}]}`
    Results {
        /// Result items
        results: Vec<ContentItem>,
    },
    /// `{"result": [{"content": ...}]}`
    Result {
        /// Result items
        result: Vec<ContentItem>,
    },
    /// A bare JSON string
    Text(String),
}

impl ChatResponse {
    /// Parse a raw response body
    pub fn from_json(body: &str) -> Result<Self, LlmError> {
        serde_json::from_str(body).map_err(|e| {
            LlmError::InvalidResponse(format!("Unrecognized response shape: {}", e))
        })
    }

    /// Extract the completion text
    ///
    /// Empty or whitespace-only content counts as absent.
    pub fn into_content(self) -> Result<String, LlmError> {
        let content = match self {
            ChatResponse::Message { message } => Some(message.content),
            ChatResponse::Choices { choices } => {
                choices.into_iter().next().map(|c| c.message.content)
            }
            ChatResponse::Output { output: items }
            | ChatResponse::Results { results: items }
            | ChatResponse::Result { result: items } => {
                items.into_iter().next().map(|i| i.content)
            }
            ChatResponse::Text(text) => Some(text),
        };

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::InvalidResponse(
                "Response contained no content".to_string(),
            )),
        }
    }
}
