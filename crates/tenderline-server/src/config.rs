//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file; mail and model credentials may be
//! supplied or overridden through environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tenderline_mail::{ImapSettings, SmtpSettings};
use tenderline_workflow::{VendorEntry, WorkflowConfig};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Offending field or variable
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener
    pub server: HttpConfig,
    /// Generation and reasoning model
    pub llm: LlmConfig,
    /// Outbound mail
    pub smtp: SmtpConfig,
    /// Inbound mail
    pub imap: ImapConfig,
    /// Send record storage
    pub registry: RegistryConfig,
    /// Rendered documents
    pub documents: DocumentsConfig,
    /// Workflow timeouts and limits
    pub workflow: WorkflowConfig,
    /// Vendor directory
    pub vendors: Vec<VendorEntry>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,
    /// Bind port (e.g., 4000)
    pub bind_port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 4000,
        }
    }
}

/// Model endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible API
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: tenderline_llm::ollama::DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// SMTP settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Relay host
    pub host: Option<String>,
    /// Relay port
    pub port: u16,
    /// Login user, also the sender address
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Display name on outbound mail
    pub from_name: String,
    /// Connection timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        let defaults = SmtpSettings::default();
        Self {
            host: None,
            port: defaults.port,
            username: None,
            password: None,
            from_name: defaults.from_name,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl SmtpConfig {
    /// Settings for the SMTP transport
    pub fn settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            from_name: self.from_name.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// IMAP settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImapConfig {
    /// Server host
    pub host: Option<String>,
    /// Server port (implicit TLS)
    pub port: u16,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Folder holding replies
    pub mailbox: String,
    /// Accept self-signed certificates
    pub accept_invalid_certs: bool,
    /// Socket timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ImapConfig {
    fn default() -> Self {
        let defaults = ImapSettings::default();
        Self {
            host: None,
            port: defaults.port,
            username: None,
            password: None,
            mailbox: defaults.mailbox,
            accept_invalid_certs: defaults.accept_invalid_certs,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl ImapConfig {
    /// Settings for the IMAP mailbox
    pub fn settings(&self) -> ImapSettings {
        ImapSettings {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            mailbox: self.mailbox.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Registry backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Single JSON file
    #[default]
    Json,
    /// SQLite database
    Sqlite,
    /// Process memory (lost on restart)
    Memory,
}

/// Send record storage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Backend kind
    pub backend: RegistryBackend,
    /// File path for the json and sqlite backends
    pub path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryBackend::Json,
            path: PathBuf::from("sent_log.json"),
        }
    }
}

/// File format for rendered documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// A4 PDF
    #[default]
    Pdf,
    /// Plain UTF-8 text
    Text,
}

/// Rendered document output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Directory receiving `RFP_<millis>.<ext>` files
    pub output_dir: PathBuf,
    /// Output format
    pub format: DocumentFormat,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("rfp_documents"),
            format: DocumentFormat::Pdf,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override credentials and endpoints from `lookup`
    ///
    /// Recognized keys: `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`,
    /// `IMAP_HOST`, `IMAP_PORT`, `IMAP_USER`, `IMAP_PASS`, `LLM_ENDPOINT`,
    /// `LLM_MODEL`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SMTP_HOST") {
            self.smtp.host = Some(v);
        }
        if let Some(v) = get("SMTP_PORT") {
            self.smtp.port = parse_port("SMTP_PORT", &v)?;
        }
        if let Some(v) = get("SMTP_USER") {
            self.smtp.username = Some(v);
        }
        if let Some(v) = get("SMTP_PASS") {
            self.smtp.password = Some(v);
        }
        if let Some(v) = get("IMAP_HOST") {
            self.imap.host = Some(v);
        }
        if let Some(v) = get("IMAP_PORT") {
            self.imap.port = parse_port("IMAP_PORT", &v)?;
        }
        if let Some(v) = get("IMAP_USER") {
            self.imap.username = Some(v);
        }
        if let Some(v) = get("IMAP_PASS") {
            self.imap.password = Some(v);
        }
        if let Some(v) = get("LLM_ENDPOINT") {
            self.llm.endpoint = v;
        }
        if let Some(v) = get("LLM_MODEL") {
            self.llm.model = v;
        }
        Ok(())
    }

    /// Check values that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workflow
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "workflow".to_string(),
                reason,
            })?;

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.endpoint".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
    }
}

fn parse_port(field: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("'{}' is not a port number", value),
    })
}
