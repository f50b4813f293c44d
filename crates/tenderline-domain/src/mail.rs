//! Mail-facing value types shared by the transport, the mailbox and the
//! workflow

use crate::token::CorrelationToken;
use chrono::NaiveDate;
use std::path::PathBuf;

/// An outbound message with its recipients already deduplicated
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    /// Distinct recipient addresses
    pub recipients: Vec<String>,

    /// Subject line, including the correlation tag
    pub subject: String,

    /// Plain-text body
    pub body_text: String,

    /// Optional file attached to the message
    pub attachment: Option<PathBuf>,
}

/// Coarse mailbox search for messages referencing a token
///
/// Mailbox-side matching is only a pre-filter; callers must re-check every
/// candidate locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Token that must appear in the subject or body
    pub token: CorrelationToken,

    /// Only messages received on or after this date
    pub since: Option<NaiveDate>,
}

impl SearchCriteria {
    /// Criteria for a token, optionally limited by date
    pub fn for_token(token: CorrelationToken, since: Option<NaiveDate>) -> Self {
        Self { token, since }
    }

    /// Render as an IMAP `SEARCH` query (RFC 3501)
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use tenderline_domain::{CorrelationToken, SearchCriteria};
    ///
    /// let token = CorrelationToken::parse("t-1").unwrap();
    /// let since = NaiveDate::from_ymd_opt(2026, 10, 1);
    /// let query = SearchCriteria::for_token(token, since).to_imap_query();
    /// assert_eq!(query, r#"OR SUBJECT "t-1" BODY "t-1" SINCE 01-Oct-2026"#);
    /// ```
    pub fn to_imap_query(&self) -> String {
        let quoted = quote_imap(self.token.as_str());
        let mut query = format!("OR SUBJECT {} BODY {}", quoted, quoted);
        if let Some(since) = self.since {
            query.push_str(&format!(" SINCE {}", since.format("%d-%b-%Y")));
        }
        query
    }
}

fn quote_imap(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// A complete RFC 5322 message as returned by the mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Mailbox sequence number
    pub sequence: u32,

    /// Full message bytes, headers included
    pub bytes: Vec<u8>,
}

impl RawMessage {
    /// Create a raw message
    pub fn new(sequence: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            sequence,
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_without_since() {
        let token = CorrelationToken::parse("abc").unwrap();
        let query = SearchCriteria::for_token(token, None).to_imap_query();
        assert_eq!(query, r#"OR SUBJECT "abc" BODY "abc""#);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote_imap(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
