//! Configuration-backed vendor directory

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tenderline_domain::traits::VendorDirectory;
use tenderline_domain::DirectoryError;

/// One vendor and its contact addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorEntry {
    /// Vendor name
    pub name: String,
    /// Contact addresses
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Vendor directory held in memory
///
/// Blank names and addresses are dropped; names are unique ignoring case and
/// keep their first spelling.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<VendorEntry>,
}

impl StaticDirectory {
    /// Build a directory from configured entries
    pub fn new(entries: impl IntoIterator<Item = VendorEntry>) -> Self {
        let mut merged: Vec<VendorEntry> = Vec::new();

        for entry in entries {
            let name = entry.name.trim();
            if name.is_empty() {
                continue;
            }

            let idx = match merged.iter().position(|e| e.name.eq_ignore_ascii_case(name)) {
                Some(idx) => idx,
                None => {
                    merged.push(VendorEntry {
                        name: name.to_string(),
                        addresses: Vec::new(),
                    });
                    merged.len() - 1
                }
            };

            for address in entry.addresses {
                let address = address.trim();
                let known = merged[idx]
                    .addresses
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(address));
                if !address.is_empty() && !known {
                    merged[idx].addresses.push(address.to_string());
                }
            }
        }

        Self { entries: merged }
    }
}

#[async_trait]
impl VendorDirectory for StaticDirectory {
    async fn vendor_names(&self) -> Result<Vec<String>, DirectoryError> {
        Ok(self.entries.iter().map(|e| e.name.clone()).collect())
    }

    async fn addresses_for(&self, vendor: &str) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(vendor.trim()))
            .map(|e| e.addresses.clone())
            .unwrap_or_default())
    }
}
