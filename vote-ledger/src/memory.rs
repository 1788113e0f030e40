//! In-memory world state
//!
//! Backed by a `BTreeMap`, so range scans come out in key order for free.
//! Scans iterate a snapshot taken when the scan starts; writes made while a
//! scan is open are not observed by it.

use crate::{KeyValue, LedgerStore, RangeScan, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

/// In-memory ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryLedger {
    /// Create empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the world state
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Whether the world state is empty
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Copy of the whole world state, for comparing replicas
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.state.read().clone()
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.state.write().insert(key.to_string(), value.to_vec());

        tracing::trace!(key, len = value.len(), "State written");

        Ok(())
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        if start >= end {
            return Ok(RangeScan::empty());
        }

        let entries: Vec<KeyValue> = self
            .state
            .read()
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect();

        Ok(RangeScan::new(entries.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.get("init").unwrap(), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_put_and_get() {
        let ledger = MemoryLedger::new();
        ledger.put("init", b"{}").unwrap();

        assert_eq!(ledger.get("init").unwrap().as_deref(), Some(&b"{}"[..]));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let ledger = MemoryLedger::new();
        ledger.put("k", b"1").unwrap();
        ledger.put("k", b"2").unwrap();

        assert_eq!(ledger.get("k").unwrap().as_deref(), Some(&b"2"[..]));
    }

    #[test]
    fn test_scan_range_is_ordered_and_bounded() {
        let ledger = MemoryLedger::new();
        ledger.put("vote_carol", b"C").unwrap();
        ledger.put("init", b"{}").unwrap();
        ledger.put("vote_alice", b"A").unwrap();
        ledger.put("vote_bob", b"B").unwrap();
        ledger.put("votf", b"X").unwrap();

        let keys: Vec<String> = ledger
            .scan_range("vote_", "vote`")
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();

        assert_eq!(keys, vec!["vote_alice", "vote_bob", "vote_carol"]);
    }

    #[test]
    fn test_scan_range_inverted_bounds() {
        let ledger = MemoryLedger::new();
        ledger.put("b", b"1").unwrap();

        assert_eq!(ledger.scan_range("c", "a").unwrap().count(), 0);
        assert_eq!(ledger.scan_range("b", "b").unwrap().count(), 0);
    }

    #[test]
    fn test_scan_is_snapshot() {
        let ledger = MemoryLedger::new();
        ledger.put("vote_a", b"A").unwrap();

        let scan = ledger.scan_range("vote_", "vote`").unwrap();
        ledger.put("vote_b", b"B").unwrap();

        assert_eq!(scan.count(), 1);
    }
}
