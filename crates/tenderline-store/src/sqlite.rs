//! SQLite-backed registry

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tenderline_domain::traits::SendRegistry;
use tenderline_domain::{CorrelationToken, SendRecord, StoreError, VendorAddress};

/// Registry stored in one SQLite table
///
/// Vendor/address pairs are kept as a JSON column so a record is always read
/// back with exactly the pairs it was written with.
///
/// # Examples
///
/// ```
/// use tenderline_store::SqliteRegistry;
///
/// let registry = SqliteRegistry::new(":memory:").unwrap();
/// ```
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_error)?;
        conn.execute_batch(include_str!("schema.sql"))
            .map_err(db_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(format!("Connection lock poisoned: {}", e)))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Result<SendRecord, StoreError>> {
        let token: String = row.get(0)?;
        let created_at: String = row.get(1)?;
        let pairs: String = row.get(2)?;
        let document_ref: String = row.get(3)?;
        Ok(decode_record(token, created_at, pairs, document_ref))
    }
}

fn decode_record(
    token: String,
    created_at: String,
    pairs: String,
    document_ref: String,
) -> Result<SendRecord, StoreError> {
    let correlation_token = CorrelationToken::parse(&token).map_err(StoreError::InvalidData)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("created_at: {}", e)))?;
    let vendor_address_pairs: Vec<VendorAddress> = serde_json::from_str(&pairs)
        .map_err(|e| StoreError::InvalidData(format!("vendor_address_pairs: {}", e)))?;

    Ok(SendRecord {
        correlation_token,
        created_at,
        vendor_address_pairs,
        document_ref,
    })
}

fn db_error(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl SendRegistry for SqliteRegistry {
    fn append(&self, record: SendRecord) -> Result<(), StoreError> {
        let pairs = serde_json::to_string(&record.vendor_address_pairs)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        self.conn()?
            .execute(
                "INSERT INTO send_records (correlation_token, created_at, vendor_address_pairs, document_ref)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.correlation_token.as_str(),
                    record.created_at.to_rfc3339(),
                    pairs,
                    record.document_ref,
                ],
            )
            .map_err(db_error)?;

        Ok(())
    }

    fn lookup(&self, token: &CorrelationToken) -> Result<SendRecord, StoreError> {
        let found = self
            .conn()?
            .query_row(
                "SELECT correlation_token, created_at, vendor_address_pairs, document_ref
                 FROM send_records WHERE correlation_token = ?1",
                params![token.as_str()],
                Self::row_to_record,
            )
            .optional()
            .map_err(db_error)?;

        match found {
            Some(record) => record,
            None => Err(StoreError::NotFound(token.to_string())),
        }
    }

    fn list(&self) -> Result<Vec<SendRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT correlation_token, created_at, vendor_address_pairs, document_ref
                 FROM send_records ORDER BY seq",
            )
            .map_err(db_error)?;

        let rows = stmt
            .query_map([], Self::row_to_record)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;

        rows.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization() {
        assert!(SqliteRegistry::new(":memory:").is_ok());
    }

    #[test]
    fn test_pairs_round_trip_exactly() {
        let registry = SqliteRegistry::new(":memory:").unwrap();
        let token = CorrelationToken::new();
        let pairs = vec![
            VendorAddress::new("Acme", "sales@acme.com"),
            VendorAddress::new("Acme", "bids@acme.com"),
            VendorAddress::new("Beta", "sales@acme.com"),
        ];
        registry
            .append(SendRecord::new(token.clone(), pairs.clone(), "doc"))
            .unwrap();

        assert_eq!(registry.lookup(&token).unwrap().vendor_address_pairs, pairs);
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let registry = SqliteRegistry::new(":memory:").unwrap();
        let token = CorrelationToken::new();
        registry
            .append(SendRecord::new(token.clone(), vec![], "a"))
            .unwrap();

        let result = registry.append(SendRecord::new(token, vec![], "b"));
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let result = decode_record(
            "tok".to_string(),
            "yesterday".to_string(),
            "[]".to_string(),
            "d".to_string(),
        );
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }
}
