//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the correlation workflow and
//! infrastructure. Implementations live in other crates; tests use the
//! in-memory ones.

use crate::error::{DirectoryError, LlmError, MailError, RenderError, StoreError};
use crate::mail::{OutboundMail, RawMessage, SearchCriteria};
use crate::records::SendRecord;
use crate::token::CorrelationToken;
use async_trait::async_trait;

/// Append-only storage for send records
///
/// Implemented by the infrastructure layer (tenderline-store). There is no
/// update or delete.
pub trait SendRegistry: Send + Sync {
    /// Append a record; missing or empty storage counts as an empty list
    fn append(&self, record: SendRecord) -> Result<(), StoreError>;

    /// Find the record for a token, or [`StoreError::NotFound`]
    fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, StoreError>;

    /// All records in append order
    fn list(&self) -> Result<Vec<SendRecord>, StoreError>;
}

/// A system/user prompt pair for a chat-completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Instructions for the model
    pub system_prompt: String,

    /// The task input
    pub user_prompt: String,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Chat-completion provider used for document generation and for decisions
///
/// Implemented by the infrastructure layer (tenderline-llm)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion and return the normalized message content
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Outbound mail transport
///
/// Implemented by the infrastructure layer (tenderline-mail)
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message to all recipients and return a delivery id
    async fn send(&self, mail: &OutboundMail) -> Result<String, MailError>;
}

/// A mailbox that can open read-only sessions
///
/// Sessions are blocking; callers run them off the async executor.
pub trait Mailbox: Send + Sync {
    /// Open and authenticate a new session
    fn open(&self) -> Result<Box<dyn MailboxSession>, MailError>;
}

/// One open mailbox session
pub trait MailboxSession: Send {
    /// Run a coarse search and fetch every match without changing its flags
    fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<RawMessage>, MailError>;

    /// End the session
    fn close(&mut self) -> Result<(), MailError>;
}

/// Resolves vendor names to contact addresses
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    /// All known vendor names
    async fn vendor_names(&self) -> Result<Vec<String>, DirectoryError>;

    /// Contact addresses for one vendor; empty when unknown
    async fn addresses_for(&self, vendor: &str) -> Result<Vec<String>, DirectoryError>;
}

/// Renders generated document text into a stored file
pub trait DocumentRenderer: Send + Sync {
    /// Write the document and return a reference to it
    fn render(&self, text: &str) -> Result<String, RenderError>;
}
