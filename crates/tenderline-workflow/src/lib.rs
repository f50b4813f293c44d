//! Tenderline Workflow
//!
//! Correlates procurement requests with the vendor replies they provoke.
//!
//! # Overview
//!
//! At send time the [`RequestDispatcher`] turns a free-text description into
//! an RFP document, embeds a fresh correlation token in the subject line,
//! mails it to every resolved vendor address and appends a send record.
//! Later, independently, the [`ReplyCollector`] pulls replies mentioning the
//! token, the [`ReplyAttributor`] maps them back to vendors through the
//! recorded (vendor, address) pairs, and the [`DecisionEngine`] picks a
//! winner.
//!
//! # Architecture
//!
//! ```text
//! description → Dispatcher → LLM → Renderer → Transport → SendRegistry
//! token → Collector → Attributor → DecisionEngine → Decision
//! ```
//!
//! Optional steps degrade instead of failing: generation falls back to a
//! fixed template and selection falls back to a reply-count heuristic.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tenderline_llm::MockProvider;
//! use tenderline_mail::mock::{MockMailbox, RecordingTransport};
//! use tenderline_store::MemoryRegistry;
//! use tenderline_workflow::{
//!     Collaborators, PdfRenderer, RfpWorkflow, StaticDirectory, VendorSelection, WorkflowConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = RfpWorkflow::new(
//!     Collaborators {
//!         llm: Arc::new(MockProvider::unreachable()),
//!         directory: Arc::new(StaticDirectory::default()),
//!         renderer: Arc::new(PdfRenderer::new("rfp_documents")),
//!         transport: Arc::new(RecordingTransport::new()),
//!         mailbox: Arc::new(MockMailbox::default()),
//!         registry: Arc::new(MemoryRegistry::new()),
//!     },
//!     WorkflowConfig::default(),
//! );
//!
//! let sent = workflow
//!     .dispatch("Need a website", &[VendorSelection::with_address("Acme", "acme@x.com")])
//!     .await?;
//!
//! let report = workflow.decide(&sent.token, None, None).await?;
//! println!("Winner: {:?}", report.decision.selected_vendor);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod attributor;
mod blocking;
mod collector;
mod config;
mod decision;
mod directory;
mod dispatcher;
mod document;
mod error;
mod parser;
mod prompt;
mod renderer;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use attributor::ReplyAttributor;
pub use collector::ReplyCollector;
pub use config::{WorkflowConfig, DEFAULT_SUBJECT_PREFIX};
pub use decision::{fallback_decision, DecisionEngine};
pub use directory::{StaticDirectory, VendorEntry};
pub use dispatcher::RequestDispatcher;
pub use document::{DocumentSource, GeneratedDocument};
pub use error::WorkflowError;
pub use parser::{first_json_object, parse_vendor_choice, VendorChoice, MISSING_REASON};
pub use renderer::{PdfRenderer, TextFileRenderer};
pub use service::{Collaborators, RfpWorkflow};
pub use types::{DecisionReport, DispatchOutcome, ReplyReport, StoredDocument, VendorSelection};
