//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `world_state` - Election world state (key: UTF-8 ledger key, value: raw bytes)
//!
//! Keys are stored as their UTF-8 bytes, so RocksDB's default byte-wise
//! comparator gives the same ordering as `str` comparison.

use crate::{
    error::{Error, Result},
    Config, KeyValue, LedgerStore, RangeScan,
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};
use std::fmt;
use std::sync::Arc;

/// Column family names
const CF_WORLD_STATE: &str = "world_state";

/// RocksDB-backed ledger
pub struct RocksLedger {
    db: Arc<DB>,
}

impl fmt::Debug for RocksLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksLedger")
            .field("path", &self.db.path())
            .finish()
    }
}

impl RocksLedger {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_WORLD_STATE,
            Self::cf_options_world_state(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB world state");

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options_world_state() -> Options {
        let mut opts = Options::default();
        // Point lookups dominate (init key, per-voter keys)
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_WORLD_STATE)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_WORLD_STATE)))
    }

    fn decode_key(key: Box<[u8]>) -> Result<String> {
        String::from_utf8(key.into_vec())
            .map_err(|e| Error::Encoding(format!("Ledger key is not UTF-8: {}", e)))
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        let cf = self.cf_handle()?;

        let approximate_keys = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);

        Ok(StorageStats { approximate_keys })
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> Result<()> {
        let cf = self.cf_handle()?;
        self.db.flush_cf(cf)?;
        Ok(())
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        self.flush()?;
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl LedgerStore for RocksLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf_handle()?;
        self.db.put_cf(cf, key.as_bytes(), value)?;

        tracing::debug!(key, len = value.len(), "State written");

        Ok(())
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<RangeScan<'_>> {
        if start >= end {
            return Ok(RangeScan::empty());
        }

        let cf = self.cf_handle()?;
        let end = end.as_bytes().to_vec();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(start.as_bytes(), Direction::Forward))
            .take_while(move |item| match item {
                Ok((key, _)) => &key[..] < &end[..],
                Err(_) => true,
            })
            .map(|item| -> Result<KeyValue> {
                let (key, value) = item?;
                Ok(KeyValue::new(Self::decode_key(key)?, value.into_vec()))
            });

        Ok(RangeScan::new(iter))
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// RocksDB's estimate of live keys in the world state
    pub approximate_keys: u64,
}
