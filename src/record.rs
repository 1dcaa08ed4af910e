//! Submission records and their flat CSV representation
//!
//! A stored record is a header plus one row:
//!
//! ```text
//! Name,target,Score,Submission Time
//! alice,"[7, 2, 1, 0]",0.75,2026-10-19T14:03:11.402118+03:00
//! ```
//!
//! `target` is optional. Readers also accept the legacy `%Y-%m-%d_%H-%M-%S`
//! time format and ignore extra columns (older files carry an `Entries` column).

use crate::error::StoreError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in storage keys; microseconds keep same-second submissions apart
pub const KEY_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.6f";

/// Time layout written by earlier versions of the board
pub const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Column names of a stored record
pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_TARGET: &str = "target";
pub const COLUMN_SCORE: &str = "Score";
pub const COLUMN_TIME: &str = "Submission Time";

/// One accepted submission. Never mutated after it is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Self-reported participant name
    pub name: String,
    /// Submitted labels; empty when the store was configured not to keep them
    pub predictions: Vec<i64>,
    pub score: f64,
    pub submitted_at: DateTime<FixedOffset>,
}

impl SubmissionRecord {
    /// Storage key derived from name and submission time
    pub fn key(&self) -> String {
        record_key(&self.name, &self.submitted_at)
    }
}

/// Current time normalized to `offset`
pub fn now_in(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// Reduce an untrusted name to a file-name-safe fragment.
///
/// Only ASCII alphanumerics, `-` and `_` survive; everything else becomes `_`.
/// The fragment is only used for uniqueness, the raw name lives in the record.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .take(64)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

/// `<sanitized-name>_<YYYY-mm-dd_HH-MM-SS.ffffff>`
pub fn record_key(name: &str, submitted_at: &DateTime<FixedOffset>) -> String {
    format!(
        "{}_{}",
        sanitize_name(name),
        submitted_at.format(KEY_TIME_FORMAT)
    )
}

/// Key for the `attempt`-th collision of `base` (`attempt` 0 is `base` itself)
pub fn uniquified_key(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

pub fn format_time(at: &DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parse a stored time, normalizing it to `offset`
pub fn parse_time(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&offset));
    }
    NaiveDateTime::parse_from_str(raw, LEGACY_TIME_FORMAT)
        .ok()
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// `[7, 2, 1, 0]`
pub fn format_predictions(predictions: &[i64]) -> String {
    let items: Vec<String> = predictions.iter().map(|p| p.to_string()).collect();
    format!("[{}]", items.join(", "))
}

pub fn parse_predictions(raw: &str) -> Option<Vec<i64>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|item| item.trim().parse::<i64>().ok())
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "target", default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Submission Time")]
    submitted_at: String,
}

/// Serialize a record as a flat CSV file
pub fn encode_csv(record: &SubmissionRecord, with_predictions: bool) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(StoredRow {
        name: record.name.clone(),
        target: with_predictions.then(|| format_predictions(&record.predictions)),
        score: record.score,
        submitted_at: format_time(&record.submitted_at),
    })?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Parse every row of a stored CSV file
pub fn decode_csv(
    key: &str,
    bytes: &[u8],
    offset: FixedOffset,
) -> Result<Vec<SubmissionRecord>, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: key.to_string(),
        reason,
    };

    let mut reader = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();
    for row in reader.deserialize::<StoredRow>() {
        let row = row.map_err(|e| corrupt(e.to_string()))?;
        if !row.score.is_finite() {
            return Err(corrupt(format!("non-finite score {}", row.score)));
        }
        let submitted_at = parse_time(&row.submitted_at, offset)
            .ok_or_else(|| corrupt(format!("unreadable time '{}'", row.submitted_at)))?;
        let predictions = match row.target.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_predictions(raw)
                .ok_or_else(|| corrupt(format!("unreadable target list '{}'", raw)))?,
            _ => Vec::new(),
        };
        records.push(SubmissionRecord {
            name: row.name,
            predictions,
            score: row.score,
            submitted_at,
        });
    }
    if records.is_empty() {
        return Err(corrupt("no records".to_string()));
    }
    Ok(records)
}
