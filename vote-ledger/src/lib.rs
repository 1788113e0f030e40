//! VoteChain Ledger Port
//!
//! Ordered key-value world state consumed by the election engine.
//!
//! # Architecture
//!
//! - **Port**: [`LedgerStore`] exposes point reads, point writes and ordered range scans
//! - **Memory**: [`MemoryLedger`] keeps the world state in a `BTreeMap` (tests, replay tools)
//! - **RocksDB**: [`RocksLedger`] persists the world state in a dedicated column family
//!
//! # Invariants
//!
//! - Range scans are ordered by key, byte-wise ascending
//! - Range scans are finite: `[start, end)` with an exclusive upper bound
//! - Values are stored verbatim; the ledger never interprets them

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod memory;
pub mod storage;
pub mod store;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use memory::MemoryLedger;
pub use storage::{RocksLedger, StorageStats};
pub use store::{prefix_range_end, KeyValue, LedgerStore, RangeScan};
