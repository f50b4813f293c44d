//! Parse fetched messages into reply records

use chrono::{DateTime, Utc};
use mailparse::{
    addrparse_header, dateparse, parse_headers, parse_mail, DispositionType, MailAddr,
    MailHeader, MailHeaderMap, ParsedMail,
};
use tenderline_domain::{MailError, RawMessage, ReplyRecord};

/// Parse a raw message
///
/// Body preference: first non-attachment `text/plain` part, then
/// `text/html`, then the undecoded bytes after the header block. A missing
/// `Date` header falls back to the current time.
pub fn parse_reply(raw: &RawMessage) -> Result<ReplyRecord, MailError> {
    let parsed = parse_mail(&raw.bytes).map_err(|e| MailError::Parse(e.to_string()))?;
    let headers = &parsed.headers;

    let header = |name: &str| {
        headers
            .get_first_value(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let received_at = headers
        .get_first_value("Date")
        .and_then(|d| dateparse(&d).ok())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    let references = headers
        .get_first_value("References")
        .map(|r| r.split_whitespace().collect::<Vec<_>>().join(", "))
        .unwrap_or_default();

    let body_text = find_body(&parsed, "text/plain")
        .or_else(|| find_body(&parsed, "text/html"))
        .unwrap_or_else(|| raw_body(raw));

    Ok(ReplyRecord {
        sender_address: headers.get_first_header("From").map(sender_of).unwrap_or_default(),
        subject: header("Subject"),
        received_at,
        body_text,
        message_id: header("Message-ID"),
        in_reply_to: header("In-Reply-To"),
        references,
    })
}

/// Degraded record for a message that could not be parsed
///
/// Only the body survives, as lossily decoded bytes; the local token
/// re-check still applies to it.
pub fn lossy_reply(raw: &RawMessage) -> ReplyRecord {
    ReplyRecord {
        sender_address: String::new(),
        subject: String::new(),
        received_at: Utc::now(),
        body_text: String::from_utf8_lossy(&raw.bytes).into_owned(),
        message_id: String::new(),
        in_reply_to: String::new(),
        references: String::new(),
    }
}

fn find_body(part: &ParsedMail<'_>, mimetype: &str) -> Option<String> {
    if !part.subparts.is_empty() {
        return part.subparts.iter().find_map(|p| find_body(p, mimetype));
    }

    if !part.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
        return None;
    }
    if part.get_content_disposition().disposition == DispositionType::Attachment {
        return None;
    }

    part.get_body().ok().filter(|b| !b.trim().is_empty())
}

fn raw_body(raw: &RawMessage) -> String {
    let body = match parse_headers(&raw.bytes) {
        Ok((_, offset)) => &raw.bytes[offset..],
        Err(_) => &raw.bytes[..],
    };
    String::from_utf8_lossy(body).into_owned()
}

/// Bare address of the first sender, or the header text if unparsable
fn sender_of(header: &MailHeader<'_>) -> String {
    let first = addrparse_header(header).ok().and_then(|list| {
        list.iter().find_map(|addr| match addr {
            MailAddr::Single(info) => Some(info.addr.clone()),
            MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.clone()),
        })
    });
    first.unwrap_or_else(|| header.get_value().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawMessage {
        RawMessage::new(1, text.replace('\n', "\r\n"))
    }

    #[test]
    fn test_plain_message_headers() {
        let reply = parse_reply(&raw(
            "From: \"Acme Sales\" <Sales@Acme.com>\n\
             Subject: Re: Generated RFP [sendId:tok-1]\n\
             Date: Fri, 16 Oct 2026 09:30:00 +0000\n\
             Message-ID: <reply-1@acme.com>\n\
             In-Reply-To: <orig-1@example.com>\n\
             References: <orig-1@example.com>\n <thread-0@example.com>\n\
             \n\
             We can deliver in six weeks.\n",
        ))
        .unwrap();

        assert_eq!(reply.sender_address, "Sales@Acme.com");
        assert_eq!(reply.subject, "Re: Generated RFP [sendId:tok-1]");
        assert_eq!(reply.received_at.to_rfc3339(), "2026-10-16T09:30:00+00:00");
        assert_eq!(reply.message_id, "<reply-1@acme.com>");
        assert_eq!(reply.in_reply_to, "<orig-1@example.com>");
        assert_eq!(reply.references, "<orig-1@example.com>, <thread-0@example.com>");
        assert_eq!(reply.body_text.trim(), "We can deliver in six weeks.");
    }

    #[test]
    fn test_prefers_plain_over_html() {
        let reply = parse_reply(&raw(
            "From: a@acme.com\n\
             Subject: quote\n\
             Content-Type: multipart/alternative; boundary=\"b1\"\n\
             \n\
             --b1\n\
             Content-Type: text/html\n\
             \n\
             <p>html body</p>\n\
             --b1\n\
             Content-Type: text/plain\n\
             \n\
             plain body\n\
             --b1--\n",
        ))
        .unwrap();
        assert_eq!(reply.body_text.trim(), "plain body");
    }

    #[test]
    fn test_falls_back_to_html() {
        let reply = parse_reply(&raw(
            "From: a@acme.com\n\
             Subject: quote\n\
             Content-Type: multipart/mixed; boundary=\"b1\"\n\
             \n\
             --b1\n\
             Content-Type: text/html\n\
             \n\
             <p>html only</p>\n\
             --b1\n\
             Content-Type: text/plain\n\
             Content-Disposition: attachment; filename=\"notes.txt\"\n\
             \n\
             attached notes\n\
             --b1--\n",
        ))
        .unwrap();
        assert_eq!(reply.body_text.trim(), "<p>html only</p>");
    }

    #[test]
    fn test_falls_back_to_raw_bytes() {
        let reply = parse_reply(&raw(
            "From: a@acme.com\n\
             Subject: scan\n\
             Content-Type: application/pdf\n\
             \n\
             %PDF-raw-bytes\n",
        ))
        .unwrap();
        assert!(reply.body_text.contains("%PDF-raw-bytes"));
    }

    #[test]
    fn test_missing_date_uses_now() {
        let before = Utc::now();
        let reply = parse_reply(&raw("From: a@acme.com\nSubject: x\n\nbody\n")).unwrap();
        assert!(reply.received_at >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_unparsable_from_kept_verbatim() {
        let reply = parse_reply(&raw("From: not-an-address\nSubject: x\n\nbody\n")).unwrap();
        assert!(reply.sender_address.contains("not-an-address"));
    }

    #[test]
    fn test_lossy_reply_keeps_body() {
        let reply = lossy_reply(&RawMessage::new(3, vec![0xff, b't', b'o', b'k']));
        assert!(reply.body_text.ends_with("tok"));
        assert!(reply.sender_address.is_empty());
    }
}
