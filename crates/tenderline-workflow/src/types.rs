//! Request and response types for the workflow

use crate::document::DocumentSource;
use serde::{Deserialize, Serialize};
use tenderline_domain::{AttributedReply, CorrelationToken, Decision, VendorAddress};

/// A vendor chosen for a dispatch
///
/// Without an explicit address the vendor directory is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSelection {
    /// Vendor name
    pub vendor: String,

    /// Explicit contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl VendorSelection {
    /// Select a vendor by name only
    pub fn named(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            address: None,
        }
    }

    /// Select a vendor with an explicit address
    pub fn with_address(vendor: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            address: Some(address.into()),
        }
    }
}

/// Result of a dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// Correlation token embedded in the subject
    pub token: CorrelationToken,

    /// Distinct addresses the message went to
    pub recipients: Vec<String>,

    /// Every vendor/address pair recorded for attribution
    pub vendor_address_pairs: Vec<VendorAddress>,

    /// Reference to the rendered document
    pub document_ref: String,

    /// Document text that was sent
    pub document_text: String,

    /// Whether the text came from the model or the template
    pub document_source: DocumentSource,

    /// Identifier returned by the transport
    pub delivery_id: String,

    /// Non-fatal problems, e.g. a failed registry write
    pub warnings: Vec<String>,
}

/// A rendered document read back from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// File name, e.g. `RFP_1760000000000.pdf`
    pub file_name: String,

    /// MIME type derived from the file extension
    pub content_type: &'static str,

    /// File contents
    pub bytes: Vec<u8>,
}

/// Collected and attributed replies for one token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyReport {
    /// Correlation token
    pub token: CorrelationToken,

    /// Replies in mailbox order
    pub replies: Vec<AttributedReply>,
}

/// A decision with the replies it was based on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReport {
    /// Correlation token
    pub token: CorrelationToken,

    /// Candidate vendors, in tie-break order
    pub vendor_names: Vec<String>,

    /// Number of replies that passed the token check
    pub reply_count: usize,

    /// The selection
    pub decision: Decision,
}
