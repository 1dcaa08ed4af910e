//! One CSV file per submission in a flat directory
//!
//! Each record is staged in a hidden scratch file and hard-linked to its
//! `<key>.csv` name, so a failed write never leaves a partial record behind.

use super::{RawRecord, StoreSnapshot, SubmissionStore, MAX_KEY_ATTEMPTS};
use crate::error::StoreError;
use crate::record::{decode_csv, encode_csv, uniquified_key, SubmissionRecord};
use chrono::FixedOffset;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write a record to `staging`, sync it, then hard-link it to `target`.
///
/// `target` only ever appears fully written. The link fails with
/// `AlreadyExists` when the key is taken. `staging` is removed on every path.
fn publish(
    staging: &Path,
    target: &Path,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<()> {
    fn stage_and_link(
        staging: &Path,
        target: &Path,
        write: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(staging)?;
        write(&mut file)?;
        file.sync_all()?;
        drop(file);
        std::fs::hard_link(staging, target)
    }

    let result = stage_and_link(staging, target, write);
    if let Err(e) = std::fs::remove_file(staging) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Could not remove staging file {:?}: {}", staging, e);
        }
    }
    result
}

pub struct CsvDirStore {
    dir: PathBuf,
    offset: FixedOffset,
    store_predictions: bool,
}

impl CsvDirStore {
    /// Open (and create if needed) the submissions directory
    pub fn open(
        dir: impl AsRef<Path>,
        offset: FixedOffset,
        store_predictions: bool,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        info!("Submission directory ready at {:?}", dir);
        Ok(Self {
            dir,
            offset,
            store_predictions,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-append scratch file; never matches the `*.csv` listing
    fn staging_path(&self, key: &str) -> PathBuf {
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".{}.{}-{}.tmp", key, std::process::id(), n))
    }

    /// `(key, path)` of every stored file, sorted by key
    fn list(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

impl SubmissionStore for CsvDirStore {
    fn append(&self, record: &SubmissionRecord) -> Result<String, StoreError> {
        let bytes = encode_csv(record, self.store_predictions)?;
        let base = record.key();

        for attempt in 0..MAX_KEY_ATTEMPTS {
            let key = uniquified_key(&base, attempt);
            let path = self.dir.join(format!("{}.csv", key));
            let staging = self.staging_path(&key);
            match publish(&staging, &path, |file| file.write_all(&bytes)) {
                Ok(()) => return Ok(key),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free key for {} after {} attempts", base, MAX_KEY_ATTEMPTS),
        )))
    }

    fn load_all(&self) -> Result<StoreSnapshot, StoreError> {
        let mut snapshot = StoreSnapshot::default();
        for (key, path) in self.list()? {
            let decoded = std::fs::read(&path)
                .map_err(StoreError::from)
                .and_then(|bytes| decode_csv(&key, &bytes, self.offset));
            match decoded {
                Ok(records) => snapshot.records.extend(records),
                Err(e) => {
                    warn!("Skipping unreadable submission {}: {}", key, e);
                    snapshot.unreadable.push(key);
                }
            }
        }
        Ok(snapshot)
    }

    fn raw_records(&self) -> Result<Vec<RawRecord>, StoreError> {
        self.list()?
            .into_iter()
            .map(|(key, path)| {
                let bytes = std::fs::read(&path)?;
                Ok(RawRecord { key, bytes })
            })
            .collect()
    }
}
