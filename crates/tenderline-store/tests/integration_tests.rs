//! Integration tests for tenderline-store
//!
//! Every backend is run through the same append/lookup/list contract.

use std::collections::HashSet;
use tempfile::TempDir;
use tenderline_domain::traits::SendRegistry;
use tenderline_domain::{CorrelationToken, SendRecord, StoreError, VendorAddress};
use tenderline_store::{JsonFileRegistry, MemoryRegistry, SqliteRegistry};

fn record(vendor: &str, address: &str) -> SendRecord {
    SendRecord::new(
        CorrelationToken::new(),
        vec![VendorAddress::new(vendor, address)],
        format!("RFP_{}.txt", vendor),
    )
}

fn check_append_order(registry: &dyn SendRegistry, n: usize) {
    let written: Vec<SendRecord> = (0..n)
        .map(|i| record(&format!("Vendor{}", i), &format!("v{}@example.com", i)))
        .collect();

    for r in &written {
        registry.append(r.clone()).unwrap();
    }

    let listed = registry.list().unwrap();
    assert_eq!(listed.len(), n, "Should list exactly N records");
    for (w, l) in written.iter().zip(&listed) {
        assert_eq!(w.correlation_token, l.correlation_token, "Append order preserved");
        assert_eq!(w.vendor_address_pairs, l.vendor_address_pairs);
    }

    let tokens: HashSet<_> = listed.iter().map(|r| r.correlation_token.clone()).collect();
    assert_eq!(tokens.len(), n, "Tokens should be unique");
}

fn check_lookup(registry: &dyn SendRegistry) {
    let first = record("Acme", "acme@x.com");
    let second = record("Beta", "beta@y.com");
    registry.append(first.clone()).unwrap();
    registry.append(second.clone()).unwrap();

    let found = registry.lookup(&second.correlation_token).unwrap();
    assert_eq!(found.vendor_address_pairs, second.vendor_address_pairs);
    assert_eq!(found.document_ref, second.document_ref);
    assert_eq!(found.created_at, second.created_at);

    let missing = registry.lookup(&CorrelationToken::new());
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[test]
fn test_memory_registry_contract() {
    check_append_order(&MemoryRegistry::new(), 25);
    check_lookup(&MemoryRegistry::new());
}

#[test]
fn test_json_file_registry_contract() {
    let dir = TempDir::new().unwrap();
    check_append_order(&JsonFileRegistry::new(dir.path().join("a.json")), 25);
    check_lookup(&JsonFileRegistry::new(dir.path().join("b.json")));
}

#[test]
fn test_sqlite_registry_contract() {
    check_append_order(&SqliteRegistry::new(":memory:").unwrap(), 25);
    check_lookup(&SqliteRegistry::new(":memory:").unwrap());
}

#[test]
fn test_json_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sent.json");
    let r = record("Acme", "acme@x.com");

    JsonFileRegistry::new(&path).append(r.clone()).unwrap();

    let reopened = JsonFileRegistry::new(&path);
    assert_eq!(reopened.lookup(&r.correlation_token).unwrap(), r);
}

#[test]
fn test_json_file_matches_persisted_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sent.json");
    let registry = JsonFileRegistry::new(&path);
    registry.append(record("Acme", "acme@x.com")).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &raw.as_array().unwrap()[0];
    assert!(entry["correlationToken"].is_string());
    assert!(entry["createdAt"].is_string());
    assert_eq!(entry["vendorAddressPairs"][0]["vendor"], "Acme");
    assert_eq!(entry["vendorAddressPairs"][0]["address"], "acme@x.com");
    assert_eq!(entry["documentRef"], "RFP_Acme.txt");
}

#[test]
fn test_sqlite_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sent.db");
    let r = record("Acme", "acme@x.com");

    SqliteRegistry::new(&path).unwrap().append(r.clone()).unwrap();

    let reopened = SqliteRegistry::new(&path).unwrap();
    assert_eq!(reopened.list().unwrap().len(), 1);
    assert_eq!(
        reopened.lookup(&r.correlation_token).unwrap().vendor_address_pairs,
        r.vendor_address_pairs
    );
}
