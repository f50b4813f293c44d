//! Error types for the workflow

use tenderline_domain::{DirectoryError, LlmError, MailError, RenderError, StoreError};
use thiserror::Error;

/// Errors surfaced by workflow operations
///
/// Only required steps return these to callers. `ContentGenerationUnavailable`
/// and `ParseFailure` are logged where they occur and resolved through a
/// fallback path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Required credentials or settings are absent
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The generation collaborator failed
    #[error("Content generation unavailable: {0}")]
    ContentGenerationUnavailable(String),

    /// Mail send or fetch failed
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Unknown correlation token or unresolvable vendor
    #[error("Not found: {0}")]
    NotFound(String),

    /// A collaborator or mail body could not be parsed
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// The caller supplied unusable input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Registry, directory or document storage failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::ConfigurationMissing(_) => "configuration_missing",
            WorkflowError::ContentGenerationUnavailable(_) => "content_generation_unavailable",
            WorkflowError::TransportFailure(_) => "transport_failure",
            WorkflowError::NotFound(_) => "not_found",
            WorkflowError::ParseFailure(_) => "parse_failure",
            WorkflowError::InvalidRequest(_) => "invalid_request",
            WorkflowError::Storage(_) => "storage",
        }
    }
}

impl From<MailError> for WorkflowError {
    fn from(e: MailError) -> Self {
        match e {
            MailError::ConfigurationMissing(what) => WorkflowError::ConfigurationMissing(what),
            MailError::Parse(msg) => WorkflowError::ParseFailure(msg),
            other => WorkflowError::TransportFailure(other.to_string()),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(token) => {
                WorkflowError::NotFound(format!("no send record for token {}", token))
            }
            other => WorkflowError::Storage(other.to_string()),
        }
    }
}

impl From<LlmError> for WorkflowError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::InvalidResponse(msg) => WorkflowError::ParseFailure(msg),
            other => WorkflowError::ContentGenerationUnavailable(other.to_string()),
        }
    }
}

impl From<DirectoryError> for WorkflowError {
    fn from(e: DirectoryError) -> Self {
        WorkflowError::Storage(e.to_string())
    }
}

impl From<RenderError> for WorkflowError {
    fn from(e: RenderError) -> Self {
        WorkflowError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(e: serde_json::Error) -> Self {
        WorkflowError::ParseFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_error_mapping() {
        let missing: WorkflowError = MailError::ConfigurationMissing("imap host".into()).into();
        assert_eq!(missing.code(), "configuration_missing");

        let refused: WorkflowError = MailError::Connection("refused".into()).into();
        assert_eq!(refused.code(), "transport_failure");

        let timeout: WorkflowError = MailError::Timeout.into();
        assert_eq!(timeout.code(), "transport_failure");
    }

    #[test]
    fn test_send_time_message_error_is_transport_failure() {
        let rejected: WorkflowError =
            MailError::InvalidMessage("attachment RFP_1.pdf: not found".into()).into();
        assert_eq!(rejected.code(), "transport_failure");
        assert!(rejected.to_string().contains("RFP_1.pdf"));
    }

    #[test]
    fn test_store_not_found_keeps_token() {
        let err: WorkflowError = StoreError::NotFound("tok-9".into()).into();
        assert_eq!(err.code(), "not_found");
        assert!(err.to_string().contains("tok-9"));
    }
}
