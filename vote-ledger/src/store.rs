//! Ledger port
//!
//! The contract the election engine consumes. Implementations decide durability;
//! the engine only relies on:
//!
//! - `get` returning exactly what the last `put` for that key stored
//! - `scan_range` yielding every key in `[start, end)` in ascending byte order
//!
//! # Example
//!
//! ```
//! use vote_ledger::{LedgerStore, MemoryLedger};
//!
//! # fn main() -> vote_ledger::Result<()> {
//! let ledger = MemoryLedger::new();
//! ledger.put("vote_alice", b"\"A\"")?;
//!
//! let votes: Vec<_> = ledger
//!     .scan_range("vote_", "vote`")?
//!     .collect::<vote_ledger::Result<_>>()?;
//! assert_eq!(votes.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::Result;
use std::fmt;
use std::sync::Arc;

/// A single world-state entry returned by a range scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Ledger key
    pub key: String,

    /// Raw value bytes
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Create new entry
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered, finite iterator over a key range
///
/// Dropping the scan releases whatever the backend holds open (snapshot, iterator).
pub struct RangeScan<'a> {
    inner: Box<dyn Iterator<Item = Result<KeyValue>> + 'a>,
}

impl<'a> RangeScan<'a> {
    /// Wrap a backend iterator
    pub fn new(iter: impl Iterator<Item = Result<KeyValue>> + 'a) -> Self {
        Self {
            inner: Box::new(iter),
        }
    }

    /// An empty scan
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for RangeScan<'_> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for RangeScan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeScan").finish_non_exhaustive()
    }
}

/// Ordered key-value world state
pub trait LedgerStore: Send + Sync {
    /// Point read; `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Point write
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Ordered scan over `[start, end)`
    fn scan_range(&self, start: &str, end: &str) -> Result<RangeScan<'_>>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        (**self).scan_range(start, end)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        (**self).scan_range(start, end)
    }
}

/// Smallest key greater than every key that starts with `prefix`
///
/// Returns `None` when no such key exists (empty prefix, or every character is `char::MAX`),
/// in which case the scan has no upper bound.
pub fn prefix_range_end(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();

    while let Some(last) = chars.pop() {
        let next = (last as u32 + 1..=char::MAX as u32).find_map(char::from_u32);
        if let Some(next) = next {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }

    None
}
