//! Reply collection
//!
//! Two stages, both always applied: the mailbox's own search narrows the
//! candidates, then every candidate is re-checked locally for the token in
//! its decoded subject or body. Mailbox-side matching alone is not trusted.

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use chrono::NaiveDate;
use std::sync::Arc;
use tenderline_domain::traits::{Mailbox, MailboxSession};
use tenderline_domain::{CorrelationToken, MailError, RawMessage, ReplyRecord, SearchCriteria};
use tenderline_mail::{lossy_reply, parse_reply};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Fetches replies that reference a correlation token
pub struct ReplyCollector {
    mailbox: Arc<dyn Mailbox>,
    config: WorkflowConfig,
}

impl ReplyCollector {
    /// Create a new collector
    pub fn new(mailbox: Arc<dyn Mailbox>, config: WorkflowConfig) -> Self {
        Self { mailbox, config }
    }

    /// Fetch replies for `token`, optionally only those since a date
    ///
    /// One mailbox session is opened per call and closed on every exit path.
    pub async fn fetch(
        &self,
        token: &CorrelationToken,
        since: Option<NaiveDate>,
    ) -> Result<Vec<ReplyRecord>, WorkflowError> {
        let mailbox = Arc::clone(&self.mailbox);
        let criteria = SearchCriteria::for_token(token.clone(), since);

        // IMAP clients block; the session lives entirely on the blocking pool
        let task = tokio::task::spawn_blocking(move || search_mailbox(mailbox.as_ref(), &criteria));

        let candidates = match timeout(self.config.mailbox_timeout(), task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(WorkflowError::TransportFailure(format!(
                    "mailbox task failed: {}",
                    e
                )))
            }
            Err(_) => {
                return Err(WorkflowError::TransportFailure(format!(
                    "mailbox did not answer within {}s",
                    self.config.mailbox_timeout_secs
                )))
            }
        };

        let fetched = candidates.len();
        let replies: Vec<ReplyRecord> = candidates
            .iter()
            .map(decode)
            .filter(|reply| {
                let keep = reply.mentions(token);
                if !keep {
                    debug!(subject = %reply.subject, "discarding message without token");
                }
                keep
            })
            .collect();

        info!(
            token = %token,
            fetched,
            kept = replies.len(),
            "replies collected"
        );
        Ok(replies)
    }
}

fn decode(raw: &RawMessage) -> ReplyRecord {
    parse_reply(raw).unwrap_or_else(|e| {
        let failure = WorkflowError::from(e);
        warn!(sequence = raw.sequence, error = %failure, "unparsable message, using raw text");
        lossy_reply(raw)
    })
}

fn search_mailbox(
    mailbox: &dyn Mailbox,
    criteria: &SearchCriteria,
) -> Result<Vec<RawMessage>, MailError> {
    let mut guard = SessionGuard::new(mailbox.open()?);
    guard.session.search(criteria)
}

/// Closes the wrapped session when dropped
struct SessionGuard {
    session: Box<dyn MailboxSession>,
}

impl SessionGuard {
    fn new(session: Box<dyn MailboxSession>) -> Self {
        Self { session }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            warn!(error = %e, "failed to close mailbox session");
        }
    }
}
