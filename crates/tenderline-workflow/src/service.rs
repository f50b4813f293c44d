//! End-to-end workflow facade

use crate::attributor::ReplyAttributor;
use crate::blocking::run_blocking;
use crate::collector::ReplyCollector;
use crate::config::WorkflowConfig;
use crate::decision::DecisionEngine;
use crate::dispatcher::RequestDispatcher;
use crate::error::WorkflowError;
use crate::types::{DecisionReport, DispatchOutcome, ReplyReport, StoredDocument, VendorSelection};
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tenderline_domain::traits::{
    ChatProvider, DocumentRenderer, MailTransport, Mailbox, SendRegistry, VendorDirectory,
};
use tenderline_domain::{CorrelationToken, SendRecord};
use tenderline_mail::content_type_for;

/// Collaborators the workflow is assembled from
#[derive(Clone)]
pub struct Collaborators {
    /// Generation and reasoning model
    pub llm: Arc<dyn ChatProvider>,
    /// Vendor name and address lookup
    pub directory: Arc<dyn VendorDirectory>,
    /// Document writer
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Outbound mail
    pub transport: Arc<dyn MailTransport>,
    /// Inbound mail
    pub mailbox: Arc<dyn Mailbox>,
    /// Send records
    pub registry: Arc<dyn SendRegistry>,
}

/// Dispatch at send time; collect, attribute and decide later
pub struct RfpWorkflow {
    dispatcher: RequestDispatcher,
    collector: ReplyCollector,
    attributor: ReplyAttributor,
    engine: DecisionEngine,
    directory: Arc<dyn VendorDirectory>,
    registry: Arc<dyn SendRegistry>,
}

impl RfpWorkflow {
    /// Assemble the workflow
    pub fn new(parts: Collaborators, config: WorkflowConfig) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(
                Arc::clone(&parts.llm),
                Arc::clone(&parts.directory),
                parts.renderer,
                parts.transport,
                Arc::clone(&parts.registry),
                config.clone(),
            ),
            collector: ReplyCollector::new(parts.mailbox, config.clone()),
            attributor: ReplyAttributor,
            engine: DecisionEngine::new(parts.llm, config),
            directory: parts.directory,
            registry: parts.registry,
        }
    }

    /// The dispatcher, for document generation on its own
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Vendor names known to the directory
    pub async fn vendor_names(&self) -> Result<Vec<String>, WorkflowError> {
        Ok(self.directory.vendor_names().await?)
    }

    /// Generate, send and record an RFP
    pub async fn dispatch(
        &self,
        description: &str,
        selections: &[VendorSelection],
    ) -> Result<DispatchOutcome, WorkflowError> {
        self.dispatcher.dispatch(description, selections).await
    }

    /// Send record for a token
    pub async fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, WorkflowError> {
        let registry = Arc::clone(&self.registry);
        let token = token.clone();
        run_blocking("registry lookup", move || Ok(registry.lookup(&token)?)).await
    }

    /// The rendered document recorded for a token
    ///
    /// A record whose file has since been removed is reported as `NotFound`.
    pub async fn document(
        &self,
        token: &CorrelationToken,
    ) -> Result<StoredDocument, WorkflowError> {
        let record = self.lookup(token).await?;
        let path = Path::new(&record.document_ref);

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => WorkflowError::NotFound(format!(
                "document for token {} is no longer stored",
                token
            )),
            _ => WorkflowError::Storage(format!("{}: {}", path.display(), e)),
        })?;

        Ok(StoredDocument {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string()),
            content_type: content_type_for(path),
            bytes,
        })
    }

    /// Collect and attribute replies for a token
    pub async fn replies(
        &self,
        token: &CorrelationToken,
        since: Option<NaiveDate>,
    ) -> Result<ReplyReport, WorkflowError> {
        let record = self.lookup(token).await?;
        let replies = self.collector.fetch(token, since).await?;
        Ok(ReplyReport {
            token: token.clone(),
            replies: self.attributor.attribute(&record, replies),
        })
    }

    /// Collect, attribute and pick a winner
    ///
    /// Without explicit `vendor_names` the distinct vendors of the send
    /// record are used, in the order they were sent to.
    pub async fn decide(
        &self,
        token: &CorrelationToken,
        since: Option<NaiveDate>,
        vendor_names: Option<Vec<String>>,
    ) -> Result<DecisionReport, WorkflowError> {
        let record = self.lookup(token).await?;
        let vendor_names = vendor_names
            .filter(|names| !names.is_empty())
            .unwrap_or_else(|| record.vendor_names());

        let replies = self.collector.fetch(token, since).await?;
        let attributed = self.attributor.attribute(&record, replies);
        let decision = self.engine.decide(token, &vendor_names, &attributed).await;

        Ok(DecisionReport {
            token: token.clone(),
            vendor_names,
            reply_count: attributed.len(),
            decision,
        })
    }
}
