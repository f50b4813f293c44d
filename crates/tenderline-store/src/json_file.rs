//! Single-file JSON registry
//!
//! The file holds one JSON array of send records in append order. Each
//! append reads the whole file, pushes, and rewrites it through a sibling
//! temporary file so a crash mid-write leaves the previous contents intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tenderline_domain::traits::SendRegistry;
use tenderline_domain::{CorrelationToken, SendRecord, StoreError};
use tracing::debug;

/// Registry persisted as a JSON array in one file
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    /// Use the file at `path`; it does not need to exist yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records; a missing or blank file is an empty list
    fn load(&self) -> Result<Vec<SendRecord>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(format!("{}: {}", self.path.display(), e))),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| StoreError::InvalidData(format!("{}: {}", self.path.display(), e)))
    }

    fn persist(&self, records: &[SendRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Io(format!("{}: {}", self.path.display(), e)))
    }
}

impl SendRegistry for JsonFileRegistry {
    fn append(&self, record: SendRecord) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(record);
        self.persist(&records)?;
        debug!(path = %self.path.display(), total = records.len(), "send record appended");
        Ok(())
    }

    fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, StoreError> {
        self.load()?
            .into_iter()
            .find(|r| &r.correlation_token == token)
            .ok_or_else(|| StoreError::NotFound(token.to_string()))
    }

    fn list(&self) -> Result<Vec<SendRecord>, StoreError> {
        self.load()
    }
}
