//! In-memory registry

use std::sync::Mutex;
use tenderline_domain::traits::SendRegistry;
use tenderline_domain::{CorrelationToken, SendRecord, StoreError};

/// Registry held in process memory
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<Vec<SendRecord>>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether no record has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<SendRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| StoreError::Io(format!("Registry lock poisoned: {}", e)))
    }
}

impl SendRegistry for MemoryRegistry {
    fn append(&self, record: SendRecord) -> Result<(), StoreError> {
        self.guard()?.push(record);
        Ok(())
    }

    fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, StoreError> {
        self.guard()?
            .iter()
            .find(|r| &r.correlation_token == token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(token.to_string()))
    }

    fn list(&self) -> Result<Vec<SendRecord>, StoreError> {
        Ok(self.guard()?.clone())
    }
}
