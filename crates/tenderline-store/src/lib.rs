//! Tenderline Storage Layer
//!
//! Implements the append-only `SendRegistry` trait from `tenderline-domain`.
//!
//! # Backends
//!
//! - [`MemoryRegistry`]: process-local, for tests and throwaway runs
//! - [`JsonFileRegistry`]: a single JSON array file, the persisted store
//!   schema
//! - [`SqliteRegistry`]: one SQLite table, for deployments that already
//!   keep an embedded database
//!
//! None of the backends coordinate between processes. Concurrent appends to
//! the same file from two processes can lose a record.
//!
//! # Examples
//!
//! ```
//! use tenderline_domain::traits::SendRegistry;
//! use tenderline_domain::{CorrelationToken, SendRecord, VendorAddress};
//! use tenderline_store::MemoryRegistry;
//!
//! let registry = MemoryRegistry::new();
//! let token = CorrelationToken::new();
//! registry
//!     .append(SendRecord::new(
//!         token.clone(),
//!         vec![VendorAddress::new("Acme", "acme@x.com")],
//!         "RFP_1.txt",
//!     ))
//!     .unwrap();
//! assert_eq!(registry.lookup(&token).unwrap().document_ref, "RFP_1.txt");
//! ```

#![warn(missing_docs)]

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileRegistry;
pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;
pub use tenderline_domain::StoreError;
