//! In-process test doubles for the mail traits
//!
//! No network access; state is shared through `Arc` so clones observe the
//! same calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use tenderline_domain::traits::{MailTransport, Mailbox, MailboxSession};
use tenderline_domain::{MailError, OutboundMail, RawMessage, SearchCriteria};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Transport that records every message instead of sending it
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundMail>>>,
    failure: Option<MailError>,
}

impl RecordingTransport {
    /// A transport whose sends all succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose sends all fail with `error`
    pub fn failing(error: MailError) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(error),
        }
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<OutboundMail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutboundMail) -> Result<String, MailError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut sent = lock(&self.sent);
        sent.push(mail.clone());
        Ok(format!("<mock-{}@tenderline.test>", sent.len()))
    }
}

#[derive(Debug, Default)]
struct Gate {
    open: Mutex<bool>,
    wake: Condvar,
}

/// Mailbox serving a fixed set of messages
///
/// Its search ignores the criteria and returns every message, like a server
/// whose matching is too loose. Opens and closes are counted so tests can
/// check that sessions are always released.
#[derive(Debug, Clone, Default)]
pub struct MockMailbox {
    messages: Vec<RawMessage>,
    open_error: Option<MailError>,
    search_error: Option<MailError>,
    gate: Option<Arc<Gate>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<SearchCriteria>>>,
}

impl MockMailbox {
    /// Mailbox holding `messages`
    pub fn with_messages(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Fail every `open` with `error`
    pub fn fail_open(mut self, error: MailError) -> Self {
        self.open_error = Some(error);
        self
    }

    /// Fail every `search` with `error` after the session opens
    pub fn fail_search(mut self, error: MailError) -> Self {
        self.search_error = Some(error);
        self
    }

    /// Block every `search` until [`MockMailbox::release`] is called
    ///
    /// Simulates a server that stops answering mid-session.
    pub fn held(mut self) -> Self {
        self.gate = Some(Arc::default());
        self
    }

    /// Let held searches return
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            *lock(&gate.open) = true;
            gate.wake.notify_all();
        }
    }

    /// Sessions opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Criteria received by searches, in order
    pub fn queries(&self) -> Vec<SearchCriteria> {
        lock(&self.queries).clone()
    }
}

impl Mailbox for MockMailbox {
    fn open(&self) -> Result<Box<dyn MailboxSession>, MailError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            mailbox: self.clone(),
        }))
    }
}

struct MockSession {
    mailbox: MockMailbox,
}

impl MailboxSession for MockSession {
    fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<RawMessage>, MailError> {
        lock(&self.mailbox.queries).push(criteria.clone());
        if let Some(gate) = &self.mailbox.gate {
            let mut open = lock(&gate.open);
            while !*open {
                open = gate
                    .wake
                    .wait(open)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        }
        if let Some(error) = &self.mailbox.search_error {
            return Err(error.clone());
        }
        Ok(self.mailbox.messages.clone())
    }

    fn close(&mut self) -> Result<(), MailError> {
        self.mailbox.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
