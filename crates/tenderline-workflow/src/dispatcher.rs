//! Request dispatch: generate, render, send, record

use crate::blocking::run_blocking;
use crate::config::WorkflowConfig;
use crate::document::GeneratedDocument;
use crate::error::WorkflowError;
use crate::prompt::rfp_request;
use crate::types::{DispatchOutcome, VendorSelection};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tenderline_domain::traits::{
    ChatProvider, DocumentRenderer, MailTransport, SendRegistry, VendorDirectory,
};
use tenderline_domain::{CorrelationToken, OutboundMail, SendRecord, VendorAddress};
use tenderline_mail::validate_address;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a description into a sent, recorded RFP
pub struct RequestDispatcher {
    llm: Arc<dyn ChatProvider>,
    directory: Arc<dyn VendorDirectory>,
    renderer: Arc<dyn DocumentRenderer>,
    transport: Arc<dyn MailTransport>,
    registry: Arc<dyn SendRegistry>,
    config: WorkflowConfig,
}

impl RequestDispatcher {
    /// Create a new dispatcher
    pub fn new(
        llm: Arc<dyn ChatProvider>,
        directory: Arc<dyn VendorDirectory>,
        renderer: Arc<dyn DocumentRenderer>,
        transport: Arc<dyn MailTransport>,
        registry: Arc<dyn SendRegistry>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            llm,
            directory,
            renderer,
            transport,
            registry,
            config,
        }
    }

    /// Generate the RFP text for a description
    ///
    /// Never fails: when the model is unreachable, times out or returns no
    /// usable content, the local template is used.
    pub async fn generate_document(&self, description: &str) -> GeneratedDocument {
        let request = rfp_request(description);

        let outcome = match timeout(self.config.generation_timeout(), self.llm.chat(&request)).await {
            Ok(Ok(content)) if !content.trim().is_empty() => Ok(content),
            Ok(Ok(_)) => Err(WorkflowError::ParseFailure("empty generation".to_string())),
            Ok(Err(e)) => Err(WorkflowError::from(e)),
            Err(_) => Err(WorkflowError::ContentGenerationUnavailable(format!(
                "no response within {}s",
                self.config.generation_timeout_secs
            ))),
        };

        match outcome {
            Ok(content) => {
                debug!(model = self.llm.model_name(), chars = content.len(), "document generated");
                GeneratedDocument::from_model(&content, description)
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "generation failed, using template");
                GeneratedDocument::template(description)
            }
        }
    }

    /// Issue a fresh correlation token
    pub fn issue_correlation_token(&self) -> CorrelationToken {
        CorrelationToken::new()
    }

    /// Generate, send and record an RFP
    ///
    /// Addresses are resolved before anything is generated. The record is
    /// appended after the send completes; a failed append is reported in
    /// `warnings` and does not undo the send.
    pub async fn dispatch(
        &self,
        description: &str,
        selections: &[VendorSelection],
    ) -> Result<DispatchOutcome, WorkflowError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(WorkflowError::InvalidRequest(
                "description must not be empty".to_string(),
            ));
        }
        if selections.is_empty() {
            return Err(WorkflowError::InvalidRequest(
                "at least one vendor must be selected".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let pairs = self.resolve_pairs(selections, &mut warnings).await?;
        let recipients = distinct_addresses(&pairs);

        info!(
            vendors = selections.len(),
            recipients = recipients.len(),
            "dispatching RFP"
        );

        let document = self.generate_document(description).await;
        let renderer = Arc::clone(&self.renderer);
        let text = document.text.clone();
        let document_ref = run_blocking("render", move || Ok(renderer.render(&text)?)).await?;

        let token = self.issue_correlation_token();
        let mail = OutboundMail {
            recipients: recipients.clone(),
            subject: format!(
                "{} - {} {}",
                self.config.subject_prefix,
                Utc::now().format("%Y-%m-%d %H:%M UTC"),
                token.subject_tag()
            ),
            body_text: format!(
                "Please find attached the generated RFP.\n\nDescription:\n{}\n\nReference: {}\n",
                description,
                token.subject_tag()
            ),
            attachment: Some(PathBuf::from(&document_ref)),
        };

        let delivery_id = match timeout(self.config.transport_timeout(), self.transport.send(&mail)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(WorkflowError::TransportFailure(format!(
                    "send timed out after {}s",
                    self.config.transport_timeout_secs
                )))
            }
        };

        let record = SendRecord::new(token.clone(), pairs.clone(), document_ref.clone());
        let registry = Arc::clone(&self.registry);
        let stored = run_blocking("registry append", move || Ok(registry.append(record)?)).await;
        if let Err(e) = stored {
            warn!(token = %token, error = %e, "email sent but send record not stored");
            warnings.push(format!("send record not stored: {}", e));
        }

        info!(token = %token, delivery_id = %delivery_id, "RFP dispatched");

        Ok(DispatchOutcome {
            token,
            recipients,
            vendor_address_pairs: pairs,
            document_ref,
            document_text: document.text,
            document_source: document.source,
            delivery_id,
            warnings,
        })
    }

    async fn resolve_pairs(
        &self,
        selections: &[VendorSelection],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<VendorAddress>, WorkflowError> {
        let mut pairs: Vec<VendorAddress> = Vec::new();

        for selection in selections {
            let vendor = selection.vendor.trim();
            if vendor.is_empty() {
                return Err(WorkflowError::InvalidRequest(
                    "vendor name must not be empty".to_string(),
                ));
            }

            let (addresses, explicit) = match selection.address.as_deref().map(str::trim) {
                Some(address) if !address.is_empty() => (vec![address.to_string()], true),
                _ => (self.directory.addresses_for(vendor).await?, false),
            };

            if addresses.is_empty() {
                warn!(vendor, "no address for vendor");
                warnings.push(format!("no address found for vendor {}", vendor));
                continue;
            }

            for address in addresses {
                let address = address.trim();
                if let Err(e) = validate_address(address) {
                    if explicit {
                        return Err(WorkflowError::InvalidRequest(e.to_string()));
                    }
                    warn!(vendor, address, "skipping malformed directory address");
                    warnings.push(format!("malformed address {} for vendor {}", address, vendor));
                    continue;
                }

                let pair = VendorAddress::new(vendor, address);
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }

        if pairs.is_empty() {
            return Err(WorkflowError::NotFound(
                "no addresses resolved for the selected vendors".to_string(),
            ));
        }
        Ok(pairs)
    }
}

/// Addresses in first-seen order, unique ignoring case
fn distinct_addresses(pairs: &[VendorAddress]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut recipients = Vec::new();
    for pair in pairs {
        let key = pair.address.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            recipients.push(pair.address.clone());
        }
    }
    recipients
}
