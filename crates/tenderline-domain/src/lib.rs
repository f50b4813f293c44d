//! Tenderline Domain Layer
//!
//! Core vocabulary for the procurement correlation engine. Everything that
//! crosses a crate boundary is defined here: the correlation token, the
//! records written at send time and read at collection time, the decision
//! returned to callers, and the trait interfaces for every external
//! collaborator (chat model, mail transport, mailbox, registry storage,
//! vendor directory, document renderer).
//!
//! ## Key Concepts
//!
//! - **Correlation token**: opaque identifier embedded in outbound subject
//!   lines as `[sendId:<token>]` so replies can be matched later
//! - **Send record**: immutable record of one dispatch, with explicit
//!   (vendor, address) pairs
//! - **Reply record**: a normalized inbound message, produced per collection
//! - **Attribution**: associating a reply with the vendor(s) it came from
//!
//! ## Architecture
//!
//! This crate holds no I/O. Infrastructure implementations of the traits in
//! [`traits`] live in the `tenderline-llm`, `tenderline-store` and
//! `tenderline-mail` crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decision;
pub mod error;
pub mod mail;
pub mod records;
pub mod token;
pub mod traits;

// Re-exports for convenience
pub use decision::{Decision, DecisionMethod};
pub use error::{DirectoryError, LlmError, MailError, RenderError, StoreError};
pub use mail::{OutboundMail, RawMessage, SearchCriteria};
pub use records::{AttributedReply, ReplyRecord, SendRecord, VendorAddress};
pub use token::CorrelationToken;
pub use traits::ChatRequest;
