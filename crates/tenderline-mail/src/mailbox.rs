//! IMAP mailbox
//!
//! Sessions select the folder with `EXAMINE` (read-only) and fetch with
//! `BODY.PEEK[]`, so collecting replies never sets `\Seen`.

use native_tls::TlsConnector;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tenderline_domain::traits::{Mailbox, MailboxSession};
use tenderline_domain::{MailError, RawMessage, SearchCriteria};
use tracing::{debug, warn};

type TlsSession = imap::Session<native_tls::TlsStream<TcpStream>>;

/// Default IMAPS port
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// IMAP connection settings
#[derive(Debug, Clone)]
pub struct ImapSettings {
    /// Server host
    pub host: Option<String>,
    /// Server port (implicit TLS)
    pub port: u16,
    /// Login user
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Folder holding replies
    pub mailbox: String,
    /// Accept self-signed certificates (development servers only)
    pub accept_invalid_certs: bool,
    /// Connect and read/write timeout
    pub timeout: Duration,
}

impl Default for ImapSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_IMAP_PORT,
            username: None,
            password: None,
            mailbox: "INBOX".to_string(),
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ImapSettings {
    fn required(&self) -> Result<(&str, &str, &str), MailError> {
        let missing = |field: &str| MailError::ConfigurationMissing(format!("imap {}", field));
        let host = self.host.as_deref().filter(|h| !h.is_empty()).ok_or_else(|| missing("host"))?;
        let user = self
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| missing("username"))?;
        let pass = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("password"))?;
        Ok((host, user, pass))
    }
}

/// Mailbox reached over IMAP with implicit TLS
#[derive(Debug, Clone)]
pub struct ImapMailbox {
    settings: ImapSettings,
}

impl ImapMailbox {
    /// Create a mailbox; nothing is contacted until [`Mailbox::open`]
    pub fn new(settings: ImapSettings) -> Self {
        Self { settings }
    }

    fn connect(&self, host: &str) -> Result<native_tls::TlsStream<TcpStream>, MailError> {
        let connection = |e: String| MailError::Connection(format!("{}:{}: {}", host, self.settings.port, e));

        let addr = (host, self.settings.port)
            .to_socket_addrs()
            .map_err(|e| connection(e.to_string()))?
            .next()
            .ok_or_else(|| connection("no address resolved".to_string()))?;

        let tcp = TcpStream::connect_timeout(&addr, self.settings.timeout)
            .map_err(|e| connection(e.to_string()))?;
        tcp.set_read_timeout(Some(self.settings.timeout))
            .and_then(|_| tcp.set_write_timeout(Some(self.settings.timeout)))
            .map_err(|e| connection(e.to_string()))?;

        let tls = TlsConnector::builder()
            .danger_accept_invalid_certs(self.settings.accept_invalid_certs)
            .build()
            .map_err(|e| connection(e.to_string()))?;

        tls.connect(host, tcp).map_err(|e| connection(e.to_string()))
    }
}

impl Mailbox for ImapMailbox {
    fn open(&self) -> Result<Box<dyn MailboxSession>, MailError> {
        let (host, user, pass) = self.settings.required()?;
        let stream = self.connect(host)?;

        let mut client = imap::Client::new(stream);
        client
            .read_greeting()
            .map_err(|e| MailError::Protocol(format!("greeting: {}", e)))?;

        let mut session = client
            .login(user, pass)
            .map_err(|(e, _)| MailError::Connection(format!("login failed: {}", e)))?;

        if let Err(e) = session.examine(&self.settings.mailbox) {
            let _ = session.logout();
            return Err(MailError::Protocol(format!(
                "EXAMINE {}: {}",
                self.settings.mailbox, e
            )));
        }

        debug!(host, mailbox = %self.settings.mailbox, "imap session opened");
        Ok(Box::new(ImapSession {
            session,
            closed: false,
        }))
    }
}

/// An authenticated, read-only IMAP session
pub struct ImapSession {
    session: TlsSession,
    closed: bool,
}

impl MailboxSession for ImapSession {
    fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<RawMessage>, MailError> {
        let query = criteria.to_imap_query();
        let mut sequences: Vec<u32> = self
            .session
            .search(&query)
            .map_err(|e| MailError::Protocol(format!("SEARCH {}: {}", query, e)))?
            .into_iter()
            .collect();

        if sequences.is_empty() {
            return Ok(Vec::new());
        }
        sequences.sort_unstable();

        let set = sequences
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let fetches = self
            .session
            .fetch(&set, "BODY.PEEK[]")
            .map_err(|e| MailError::Protocol(format!("FETCH: {}", e)))?;

        let mut messages = Vec::with_capacity(fetches.len());
        for fetch in fetches.iter() {
            match fetch.body() {
                Some(body) => messages.push(RawMessage::new(fetch.message, body.to_vec())),
                None => warn!(sequence = fetch.message, "fetch returned no body"),
            }
        }
        Ok(messages)
    }

    fn close(&mut self) -> Result<(), MailError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.session
            .logout()
            .map_err(|e| MailError::Protocol(format!("LOGOUT: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials() {
        let mailbox = ImapMailbox::new(ImapSettings::default());
        let result = mailbox.open();
        assert!(matches!(result, Err(MailError::ConfigurationMissing(_))));
    }

    #[test]
    fn test_blank_password_counts_as_missing() {
        let settings = ImapSettings {
            host: Some("imap.example.com".to_string()),
            username: Some("rfp@example.com".to_string()),
            password: Some(String::new()),
            ..ImapSettings::default()
        };
        let err = settings.required().unwrap_err();
        assert_eq!(err, MailError::ConfigurationMissing("imap password".to_string()));
    }

    #[test]
    fn test_unreachable_host_is_connection_error() {
        let settings = ImapSettings {
            host: Some("127.0.0.1".to_string()),
            port: 9,
            username: Some("u".to_string()),
            password: Some("p".to_string()),
            timeout: Duration::from_secs(2),
            ..ImapSettings::default()
        };
        let result = ImapMailbox::new(settings).open();
        assert!(matches!(result, Err(MailError::Connection(_))));
    }
}
