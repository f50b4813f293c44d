//! SMTP transport

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox as Address, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::time::Duration;
use tenderline_domain::traits::MailTransport;
use tenderline_domain::{MailError, OutboundMail};
use tracing::info;

/// Default submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default display name on outbound mail
pub const DEFAULT_FROM_NAME: &str = "RFP Generator";

/// SMTP connection settings
///
/// Host and credentials are optional so the service can start without
/// them; sending then fails with `ConfigurationMissing`.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host
    pub host: Option<String>,
    /// Relay port
    pub port: u16,
    /// Login user, also the sender address
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Display name for the `From` header
    pub from_name: String,
    /// Connection and command timeout
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            from_name: DEFAULT_FROM_NAME.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SmtpSettings {
    fn required(&self) -> Result<(&str, &str, &str), MailError> {
        let missing = |field: &str| MailError::ConfigurationMissing(format!("smtp {}", field));
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

/// Sends outbound mail through an SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    settings: SmtpSettings,
}

impl SmtpTransport {
    /// Create a transport; nothing is contacted until the first send
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// Build the MIME message and return it with its Message-ID
    async fn build_message(
        &self,
        sender: &str,
        mail: &OutboundMail,
    ) -> Result<(Message, String), MailError> {
        if mail.recipients.is_empty() {
            return Err(MailError::InvalidMessage("no recipients".to_string()));
        }

        let from: Address = format!("{} <{}>", self.settings.from_name, sender)
            .parse()
            .map_err(|e| MailError::InvalidMessage(format!("sender {}: {}", sender, e)))?;

        let domain = sender.rsplit('@').next().unwrap_or("localhost");
        let message_id = format!("<{}@{}>", uuid::Uuid::now_v7(), domain);

        let mut builder = Message::builder()
            .from(from)
            .subject(mail.subject.clone())
            .message_id(Some(message_id.clone()));

        for recipient in &mail.recipients {
            let to: Address = recipient
                .parse()
                .map_err(|e| MailError::InvalidMessage(format!("recipient {}: {}", recipient, e)))?;
            builder = builder.to(to);
        }

        let text = SinglePart::plain(mail.body_text.clone());
        let message = match &mail.attachment {
            Some(path) => {
                let attachment = load_attachment(path).await?;
                builder.multipart(MultiPart::mixed().singlepart(text).singlepart(attachment))
            }
            None => builder.singlepart(text),
        }
        .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        Ok((message, message_id))
    }
}

/// MIME type of a rendered document, by file extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Check that `address` parses as a mailbox address
pub fn validate_address(address: &str) -> Result<(), MailError> {
    address
        .parse::<Address>()
        .map(|_| ())
        .map_err(|e| MailError::InvalidMessage(format!("recipient {}: {}", address, e)))
}

async fn load_attachment(path: &Path) -> Result<SinglePart, MailError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MailError::InvalidMessage(format!("attachment {}: {}", path.display(), e)))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let content_type = ContentType::parse(content_type_for(path))
        .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

    Ok(Attachment::new(filename).body(bytes, content_type))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutboundMail) -> Result<String, MailError> {
        let (host, user, pass) = self.settings.required()?;
        let (message, message_id) = self.build_message(user, mail).await?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::Connection(e.to_string()))?
            .port(self.settings.port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .timeout(Some(self.settings.timeout))
            .build();

        mailer.send(message).await.map_err(|e| {
            if e.is_permanent() {
                MailError::Protocol(e.to_string())
            } else {
                MailError::Connection(e.to_string())
            }
        })?;

        info!(
            message_id = %message_id,
            recipients = mail.recipients.len(),
            "email sent"
        );
        Ok(message_id)
    }
}
