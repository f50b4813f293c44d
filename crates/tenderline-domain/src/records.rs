//! Send-time and collection-time records

use crate::token::CorrelationToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One explicit (vendor, address) pairing from a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorAddress {
    /// Vendor name as selected by the requester
    pub vendor: String,

    /// Contact address the document was sent to on behalf of this vendor
    pub address: String,
}

impl VendorAddress {
    /// Create a new pairing
    pub fn new(vendor: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            address: address.into(),
        }
    }
}

/// Immutable record of one dispatch
///
/// Written once by the dispatcher after transmission and only ever read
/// afterwards. The serialized form is the persisted store schema:
///
/// ```json
/// {"correlationToken": "...", "createdAt": "2026-10-16T09:30:00Z",
///  "vendorAddressPairs": [{"vendor": "Acme", "address": "acme@x.com"}],
///  "documentRef": "/var/rfp/RFP_1760607000000.txt"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    /// Token embedded in the outbound subject
    pub correlation_token: CorrelationToken,

    /// When the dispatch was recorded
    pub created_at: DateTime<Utc>,

    /// Every vendor paired with every address it was sent to
    pub vendor_address_pairs: Vec<VendorAddress>,

    /// Reference to the rendered document (file path)
    pub document_ref: String,
}

impl SendRecord {
    /// Create a record stamped with the current time
    pub fn new(
        correlation_token: CorrelationToken,
        vendor_address_pairs: Vec<VendorAddress>,
        document_ref: impl Into<String>,
    ) -> Self {
        Self {
            correlation_token,
            created_at: Utc::now(),
            vendor_address_pairs,
            document_ref: document_ref.into(),
        }
    }

    /// Distinct vendor names, in first-seen order
    pub fn vendor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for pair in &self.vendor_address_pairs {
            if !names.contains(&pair.vendor) {
                names.push(pair.vendor.clone());
            }
        }
        names
    }

    /// Addresses recorded for a single vendor
    pub fn addresses_for(&self, vendor: &str) -> Vec<&str> {
        self.vendor_address_pairs
            .iter()
            .filter(|p| p.vendor == vendor)
            .map(|p| p.address.as_str())
            .collect()
    }
}

/// A normalized inbound message, produced fresh per collection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRecord {
    /// Sender address as found in the `From` header
    pub sender_address: String,

    /// Decoded subject line
    pub subject: String,

    /// Date header, or the collection time when absent
    pub received_at: DateTime<Utc>,

    /// Decoded body (plain text, then HTML, then raw)
    pub body_text: String,

    /// `Message-ID` header
    pub message_id: String,

    /// `In-Reply-To` header
    pub in_reply_to: String,

    /// `References` header, ids joined with `, `
    pub references: String,
}

impl ReplyRecord {
    /// Whether the subject or body mentions the token, ignoring case
    pub fn mentions(&self, token: &CorrelationToken) -> bool {
        let needle = token.as_str().to_lowercase();
        self.subject.to_lowercase().contains(&needle)
            || self.body_text.to_lowercase().contains(&needle)
    }
}

/// A reply plus the vendors its sender was matched to
///
/// Unmatched replies keep an empty set; they are never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributedReply {
    /// The reply being attributed
    pub reply: ReplyRecord,

    /// Vendors whose recorded address matches the sender
    pub matched_vendors: BTreeSet<String>,
}

impl AttributedReply {
    /// Whether this reply was attributed to the given vendor, ignoring case
    pub fn is_from(&self, vendor: &str) -> bool {
        let vendor = vendor.trim().to_lowercase();
        self.matched_vendors
            .iter()
            .any(|matched| matched.to_lowercase() == vendor)
    }
}
