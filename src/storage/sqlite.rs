//! Local SQLite Storage
//!
//! One row per submission. Rows are only ever inserted; a key collision is
//! retried with a suffix rather than replacing the existing row.

use super::{RawRecord, StoreSnapshot, SubmissionStore, MAX_KEY_ATTEMPTS};
use crate::error::StoreError;
use crate::record::{
    encode_csv, format_time, parse_time, uniquified_key, SubmissionRecord, COLUMN_NAME,
    COLUMN_SCORE, COLUMN_TARGET, COLUMN_TIME,
};
use chrono::FixedOffset;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use tracing::{info, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS submissions (
    key TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    predictions_json TEXT,
    score REAL NOT NULL,
    submitted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_submissions_name ON submissions(name);
"#;

struct StoredRow {
    key: String,
    name: String,
    predictions_json: Option<String>,
    score: f64,
    submitted_at: String,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
    offset: FixedOffset,
    store_predictions: bool,
}

impl SqliteStore {
    /// Create storage at the specified path
    pub fn open(
        path: impl AsRef<Path>,
        offset: FixedOffset,
        store_predictions: bool,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        info!("Submission database initialized at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            offset,
            store_predictions,
        })
    }

    /// Create in-memory storage (for testing)
    pub fn in_memory(offset: FixedOffset) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            offset,
            store_predictions: true,
        })
    }

    fn rows(&self) -> Result<Vec<StoredRow>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT key, name, predictions_json, score, submitted_at
             FROM submissions ORDER BY rowid ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    key: row.get(0)?,
                    name: row.get(1)?,
                    predictions_json: row.get(2)?,
                    score: row.get(3)?,
                    submitted_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn decode(&self, row: &StoredRow) -> Result<SubmissionRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            key: row.key.clone(),
            reason,
        };
        let submitted_at = parse_time(&row.submitted_at, self.offset)
            .ok_or_else(|| corrupt(format!("unreadable time '{}'", row.submitted_at)))?;
        let predictions = match &row.predictions_json {
            Some(json) => serde_json::from_str(json).map_err(|e| corrupt(e.to_string()))?,
            None => Vec::new(),
        };
        Ok(SubmissionRecord {
            name: row.name.clone(),
            predictions,
            score: row.score,
            submitted_at,
        })
    }
}

/// Column values of an undecodable row, laid out like a stored record file
fn raw_row_csv(row: &StoredRow) -> Result<Vec<u8>, StoreError> {
    let score = row.score.to_string();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([COLUMN_NAME, COLUMN_TARGET, COLUMN_SCORE, COLUMN_TIME])?;
    writer.write_record([
        row.name.as_str(),
        row.predictions_json.as_deref().unwrap_or(""),
        score.as_str(),
        row.submitted_at.as_str(),
    ])?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

impl SubmissionStore for SqliteStore {
    fn append(&self, record: &SubmissionRecord) -> Result<String, StoreError> {
        let predictions_json = if self.store_predictions {
            Some(serde_json::to_string(&record.predictions)?)
        } else {
            None
        };
        let submitted_at = format_time(&record.submitted_at);
        let base = record.key();

        let conn = self.conn.lock();
        for attempt in 0..MAX_KEY_ATTEMPTS {
            let key = uniquified_key(&base, attempt);
            let inserted = conn.execute(
                "INSERT INTO submissions (key, name, predictions_json, score, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, record.name, predictions_json, record.score, submitted_at],
            );
            match inserted {
                Ok(_) => return Ok(key),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Database(format!(
            "no free key for {} after {} attempts",
            base, MAX_KEY_ATTEMPTS
        )))
    }

    fn load_all(&self) -> Result<StoreSnapshot, StoreError> {
        let mut snapshot = StoreSnapshot::default();
        for row in self.rows()? {
            match self.decode(&row) {
                Ok(record) => snapshot.records.push(record),
                Err(e) => {
                    warn!("Skipping unreadable submission {}: {}", row.key, e);
                    snapshot.unreadable.push(row.key);
                }
            }
        }
        Ok(snapshot)
    }

    /// Every row is exported; undecodable rows keep their raw column values.
    fn raw_records(&self) -> Result<Vec<RawRecord>, StoreError> {
        self.rows()?
            .into_iter()
            .map(|row| {
                let bytes = match self.decode(&row) {
                    Ok(record) => encode_csv(&record, self.store_predictions)?,
                    Err(e) => {
                        warn!("Exporting unreadable submission {} as stored: {}", row.key, e);
                        raw_row_csv(&row)?
                    }
                };
                Ok(RawRecord { key: row.key, bytes })
            })
            .collect()
    }
}
