//! Durable submission store.
//!
//! Append-only: one record per accepted submission, never updated or deleted.
//! Keys derive from `(name, submitted_at)`; a key that is already taken gets a
//! numeric suffix instead of overwriting the existing record.

pub mod csv_dir;
pub mod sqlite;

pub use csv_dir::CsvDirStore;
pub use sqlite::SqliteStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StoreError;
use crate::record::SubmissionRecord;
use chrono::FixedOffset;
use std::sync::Arc;

/// Collision suffixes tried before an append gives up
pub const MAX_KEY_ATTEMPTS: u32 = 1000;

/// A stored record exactly as persisted, for bulk export
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub key: String,
    pub bytes: Vec<u8>,
}

/// Everything that could be read from the store
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub records: Vec<SubmissionRecord>,
    /// Keys of stored entries that could not be decoded
    pub unreadable: Vec<String>,
}

pub trait SubmissionStore: Send + Sync {
    /// Persist a new record; returns the key it was stored under
    fn append(&self, record: &SubmissionRecord) -> Result<String, StoreError>;

    /// Read every stored record in insertion order where the backend knows it
    fn load_all(&self) -> Result<StoreSnapshot, StoreError>;

    /// Stored records as flat CSV files, keyed by storage key
    fn raw_records(&self) -> Result<Vec<RawRecord>, StoreError>;
}

/// Open the configured backend
pub fn open_store(
    config: &StorageConfig,
    offset: FixedOffset,
) -> Result<Arc<dyn SubmissionStore>, StoreError> {
    let store: Arc<dyn SubmissionStore> = match config.backend {
        StorageBackend::CsvDir => Arc::new(CsvDirStore::open(
            &config.path,
            offset,
            config.store_predictions,
        )?),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(
            &config.path,
            offset,
            config.store_predictions,
        )?),
    };
    Ok(store)
}
