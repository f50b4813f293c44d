//! Correlation tokens and the `[sendId:<token>]` subject tag convention

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opening marker of the correlation tag inside a subject line
pub const TAG_PREFIX: &str = "[sendId:";

/// Closing marker of the correlation tag
pub const TAG_SUFFIX: char = ']';

/// Identifier embedded in outbound subjects to match replies to a dispatch
///
/// Freshly issued tokens are UUIDv7 strings:
/// - time-ordered, so registry dumps sort chronologically
/// - 128-bit uniqueness without coordination
/// - hex digits and hyphens only, so never contain `]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationToken(String);

impl CorrelationToken {
    /// Issue a new UUIDv7-based token
    ///
    /// # Examples
    ///
    /// ```
    /// use tenderline_domain::CorrelationToken;
    ///
    /// let token = CorrelationToken::new();
    /// assert!(!token.as_str().contains(']'));
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Parse a token received from a caller or from storage
    ///
    /// Rejects empty input and anything containing `]` or whitespace, since
    /// such a token could not round-trip through a subject tag.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Correlation token must not be empty".to_string());
        }
        if s.contains(TAG_SUFFIX) {
            return Err(format!("Correlation token must not contain '{}'", TAG_SUFFIX));
        }
        if s.chars().any(char::is_whitespace) {
            return Err("Correlation token must not contain whitespace".to_string());
        }
        Ok(Self(s.to_string()))
    }

    /// The raw token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bracketed tag placed in subject lines, e.g. `[sendId:abc]`
    pub fn subject_tag(&self) -> String {
        format!("{}{}{}", TAG_PREFIX, self.0, TAG_SUFFIX)
    }

    /// Find the first correlation tag in a subject line and return its token
    ///
    /// The prefix match ignores ASCII case because some mail clients rewrite
    /// subject casing on reply.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenderline_domain::CorrelationToken;
    ///
    /// let token = CorrelationToken::extract_from_subject(
    ///     "Re: Generated RFP - 2026-10-16 [sendId:0192-ab]",
    /// ).unwrap();
    /// assert_eq!(token.as_str(), "0192-ab");
    /// ```
    pub fn extract_from_subject(subject: &str) -> Option<Self> {
        // ASCII lowercasing keeps byte offsets aligned with the original
        let lowered = subject.to_ascii_lowercase();
        let start = lowered.find(&TAG_PREFIX.to_ascii_lowercase())? + TAG_PREFIX.len();
        let rest = &subject[start..];
        let end = rest.find(TAG_SUFFIX)?;
        Self::parse(&rest[..end]).ok()
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CorrelationToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CorrelationToken> for String {
    fn from(token: CorrelationToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_tokens_are_unique() {
        let tokens: HashSet<_> = (0..10_000).map(|_| CorrelationToken::new()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn test_new_token_is_uuid_shaped() {
        let token = CorrelationToken::new();
        // 8-4-4-4-12 with hyphens
        assert_eq!(token.as_str().len(), 36);
        assert!(uuid::Uuid::parse_str(token.as_str()).is_ok());
    }

    #[test]
    fn test_subject_tag_format() {
        let token = CorrelationToken::parse("abc-123").unwrap();
        assert_eq!(token.subject_tag(), "[sendId:abc-123]");
    }

    #[test]
    fn test_extract_from_generated_subject() {
        let token = CorrelationToken::new();
        let subject = format!("Generated RFP - 2026-10-16 09:30 {}", token.subject_tag());
        assert_eq!(CorrelationToken::extract_from_subject(&subject), Some(token));
    }

    #[test]
    fn test_extract_from_reply_subject_ignores_prefix_case() {
        let subject = "RE: Generated RFP [SENDID:tok-1] thanks";
        let token = CorrelationToken::extract_from_subject(subject).unwrap();
        assert_eq!(token.as_str(), "tok-1");
    }

    #[test]
    fn test_extract_takes_first_tag() {
        let subject = "[sendId:first] fwd [sendId:second]";
        let token = CorrelationToken::extract_from_subject(subject).unwrap();
        assert_eq!(token.as_str(), "first");
    }

    #[test]
    fn test_extract_missing_or_unterminated_tag() {
        assert!(CorrelationToken::extract_from_subject("Generated RFP").is_none());
        assert!(CorrelationToken::extract_from_subject("[sendId:open-ended").is_none());
        assert!(CorrelationToken::extract_from_subject("[sendId:]").is_none());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(CorrelationToken::parse("").is_err());
        assert!(CorrelationToken::parse("a]b").is_err());
        assert!(CorrelationToken::parse("a b").is_err());
        assert!(CorrelationToken::parse("ok-token").is_ok());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let token = CorrelationToken::parse("tok-42").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#""tok-42""#);

        let back: CorrelationToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);

        let bad: Result<CorrelationToken, _> = serde_json::from_str(r#""x]y""#);
        assert!(bad.is_err());
    }
}
