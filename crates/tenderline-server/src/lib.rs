//! Tenderline Server
//!
//! HTTP front end for the RFP workflow: dispatch requests, look up send
//! records, collect replies and pick winners.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::{DocumentFormat, DocumentsConfig, RegistryBackend, RegistryConfig, ServerConfig};
use handlers::{create_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tenderline_domain::traits::{DocumentRenderer, SendRegistry};
use tenderline_llm::OllamaProvider;
use tenderline_mail::{ImapMailbox, SmtpTransport};
use tenderline_store::{JsonFileRegistry, MemoryRegistry, SqliteRegistry, StoreError};
use tenderline_workflow::{
    Collaborators, PdfRenderer, RfpWorkflow, StaticDirectory, TextFileRenderer,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Registry could not be opened
    #[error("Registry error: {0}")]
    Registry(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Open the configured send registry
pub fn open_registry(config: &RegistryConfig) -> Result<Arc<dyn SendRegistry>, ServerError> {
    let registry: Arc<dyn SendRegistry> = match config.backend {
        RegistryBackend::Json => Arc::new(JsonFileRegistry::new(&config.path)),
        RegistryBackend::Sqlite => Arc::new(SqliteRegistry::new(&config.path)?),
        RegistryBackend::Memory => {
            warn!("memory registry: send records are lost on restart");
            Arc::new(MemoryRegistry::new())
        }
    };
    Ok(registry)
}

/// Build the renderer for the configured document format
pub fn document_renderer(config: &DocumentsConfig) -> Arc<dyn DocumentRenderer> {
    match config.format {
        DocumentFormat::Pdf => Arc::new(PdfRenderer::new(&config.output_dir)),
        DocumentFormat::Text => Arc::new(TextFileRenderer::new(&config.output_dir)),
    }
}

/// Assemble production collaborators from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let llm = OllamaProvider::new(&config.llm.endpoint, &config.llm.model)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs));

    if config.smtp.host.is_none() {
        warn!("SMTP host not configured; dispatch will fail until it is");
    }
    if config.imap.host.is_none() {
        warn!("IMAP host not configured; reply collection will fail until it is");
    }

    let parts = Collaborators {
        llm: Arc::new(llm),
        directory: Arc::new(StaticDirectory::new(config.vendors.clone())),
        renderer: document_renderer(&config.documents),
        transport: Arc::new(SmtpTransport::new(config.smtp.settings())),
        mailbox: Arc::new(ImapMailbox::new(config.imap.settings())),
        registry: open_registry(&config.registry)?,
    };

    Ok(AppState::new(RfpWorkflow::new(parts, config.workflow.clone())))
}

/// Start the HTTP server
///
/// Builds the workflow from configuration and serves until the process is
/// stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Tenderline server");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {} at {}", config.llm.model, config.llm.endpoint);
    info!(
        "Registry: {:?} at {}",
        config.registry.backend,
        config.registry.path.display()
    );
    info!(
        "Documents: {:?} in {}",
        config.documents.format,
        config.documents.output_dir.display()
    );
    info!("Configured vendors: {}", config.vendors.len());

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
