//! Error types for the collaborator boundaries
//!
//! Each trait in [`crate::traits`] reports failures with one of these enums so
//! infrastructure crates can be swapped without touching the workflow.

use thiserror::Error;

/// Errors from a chat/completion provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response arrived but held no usable content
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The provider did not answer within the configured timeout
    #[error("LLM request timed out")]
    Timeout,
}

/// Errors from send-registry storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record for the given correlation token
    #[error("No send record for token: {0}")]
    NotFound(String),

    /// Backing storage could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),
}

/// Errors from the mail transport or the mailbox
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MailError {
    /// Required credentials or host settings are absent
    #[error("Mail configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Could not connect or authenticate
    #[error("Mail connection error: {0}")]
    Connection(String),

    /// Server rejected a command or returned something unexpected
    #[error("Mail protocol error: {0}")]
    Protocol(String),

    /// An address or message could not be built
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// A message body could not be parsed
    #[error("Mail parse error: {0}")]
    Parse(String),

    /// The server did not answer within the configured timeout
    #[error("Mail operation timed out")]
    Timeout,
}

/// Errors from the vendor directory
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// Directory backend unavailable
    #[error("Vendor directory unavailable: {0}")]
    Unavailable(String),
}

/// Errors from document rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The rendered file could not be written
    #[error("Failed to write document: {0}")]
    Io(String),
}
