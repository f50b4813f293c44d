//! Configuration for the workflow

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default subject prefix for outbound requests
pub const DEFAULT_SUBJECT_PREFIX: &str = "Generated RFP";

/// Configuration for dispatch, collection and decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Maximum time for document generation (seconds)
    pub generation_timeout_secs: u64,

    /// Maximum time for the winner-selection call (seconds)
    pub decision_timeout_secs: u64,

    /// Maximum time for a single outbound send (seconds)
    pub transport_timeout_secs: u64,

    /// Maximum time for one mailbox session, open to close (seconds)
    pub mailbox_timeout_secs: u64,

    /// Characters of each reply body shown to the reasoning model
    pub reply_excerpt_chars: usize,

    /// Subject line prefix; the date and correlation tag follow it
    pub subject_prefix: String,
}

impl WorkflowConfig {
    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Get the decision timeout as a Duration
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_secs(self.decision_timeout_secs)
    }

    /// Get the transport timeout as a Duration
    pub fn transport_timeout(&self) -> Duration {
        Duration::from_secs(self.transport_timeout_secs)
    }

    /// Get the mailbox timeout as a Duration
    pub fn mailbox_timeout(&self) -> Duration {
        Duration::from_secs(self.mailbox_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let timeouts = [
            ("generation_timeout_secs", self.generation_timeout_secs),
            ("decision_timeout_secs", self.decision_timeout_secs),
            ("transport_timeout_secs", self.transport_timeout_secs),
            ("mailbox_timeout_secs", self.mailbox_timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }
        if self.reply_excerpt_chars == 0 {
            return Err("reply_excerpt_chars must be greater than 0".to_string());
        }
        if self.subject_prefix.contains(']') {
            return Err("subject_prefix must not contain ']'".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: 120,
            decision_timeout_secs: 120,
            transport_timeout_secs: 60,
            mailbox_timeout_secs: 60,
            reply_excerpt_chars: 800,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        }
    }
}
