//! Tenderline Mail Layer
//!
//! Implements the mail-facing traits from `tenderline-domain`:
//!
//! - [`SmtpTransport`]: `MailTransport` over SMTP with STARTTLS
//! - [`ImapMailbox`]: `Mailbox` over IMAP, read-only sessions
//! - [`parse_reply`]: turns a fetched RFC 5322 message into a `ReplyRecord`
//!
//! Test doubles for both traits live in [`mock`].
//!
//! # Examples
//!
//! ```
//! use tenderline_domain::RawMessage;
//! use tenderline_mail::parse_reply;
//!
//! let raw = RawMessage::new(
//!     1,
//!     "From: Acme <bids@acme.com>\r\nSubject: Re: RFP [sendId:t-1]\r\n\r\nOur quote.\r\n",
//! );
//! let reply = parse_reply(&raw).unwrap();
//! assert_eq!(reply.sender_address, "bids@acme.com");
//! assert_eq!(reply.body_text.trim(), "Our quote.");
//! ```

#![warn(missing_docs)]

mod mailbox;
pub mod mock;
mod parse;
mod transport;

pub use mailbox::{ImapMailbox, ImapSettings};
pub use parse::{lossy_reply, parse_reply};
pub use tenderline_domain::MailError;
pub use transport::{content_type_for, validate_address, SmtpSettings, SmtpTransport};
