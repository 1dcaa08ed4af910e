//! Submission validation and scoring
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. Participant name
//! 2. Columns are exactly `index`, `target`
//! 3. Row count equals the round's required length
//! 4. Every target coerces to an integer label
//!
//! Only then is the score computed, frozen into a [`SubmissionRecord`] and
//! appended to the store.

use crate::config::RoundConfig;
use crate::error::{ConfigError, SubmissionError};
use crate::record::{now_in, SubmissionRecord};
use crate::scoring::{Scorer, ScoringStrategy};
use crate::storage::SubmissionStore;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Columns a submission must have, in order
pub const REQUIRED_COLUMNS: [&str; 2] = ["index", "target"];

/// Longest accepted participant name, in characters
pub const MAX_NAME_LEN: usize = 64;

/// A validated and scored prediction file that has not been stored
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    pub predictions: Vec<i64>,
    pub score: f64,
    pub strategy: ScoringStrategy,
}

/// Check the participant name; returns it trimmed
pub fn validate_name(name: &str) -> Result<&str, SubmissionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SubmissionError::InvalidName(
            "please enter your name".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(SubmissionError::InvalidName(format!(
            "names are limited to {} characters",
            MAX_NAME_LEN
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(SubmissionError::InvalidName(
            "names cannot contain control characters".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Coerce one target cell to an integer label.
///
/// Integral floats (`7.0`) are accepted because spreadsheet and dataframe
/// exports often write labels that way.
pub fn coerce_label(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(label) = raw.parse::<i64>() {
        return Some(label);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse an uploaded CSV and return the validated target column
pub fn parse_predictions(blob: &[u8], required_length: usize) -> Result<Vec<i64>, SubmissionError> {
    let blob = blob.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(blob);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(blob);

    let headers = reader
        .headers()
        .map_err(|e| SubmissionError::Parse(e.to_string()))?;
    let found: Vec<String> = headers.iter().map(str::to_string).collect();
    if found != REQUIRED_COLUMNS {
        return Err(SubmissionError::Schema { found });
    }

    let mut targets = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| SubmissionError::Parse(e.to_string()))?;
        targets.push(row.get(1).unwrap_or_default().to_string());
    }

    if targets.len() != required_length {
        return Err(SubmissionError::Length {
            expected: required_length,
            actual: targets.len(),
        });
    }

    targets
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            coerce_label(raw).ok_or_else(|| SubmissionError::TypeCoercion {
                row: i + 1,
                value: raw.clone(),
            })
        })
        .collect()
}

/// Validates, scores and stores submissions for one round
pub struct SubmissionProcessor {
    scorer: Box<dyn Scorer>,
    required_length: usize,
    offset: FixedOffset,
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionProcessor {
    pub fn new(round: &RoundConfig, store: Arc<dyn SubmissionStore>) -> Result<Self, ConfigError> {
        round.validate()?;
        Ok(Self {
            scorer: round.scoring_strategy.scorer(&round.reference_values),
            required_length: round.required_length()?,
            offset: round.utc_offset()?,
            store,
        })
    }

    pub fn required_length(&self) -> usize {
        self.required_length
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.scorer.strategy()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Validate and score a file without storing anything
    pub fn evaluate(&self, blob: &[u8]) -> Result<Evaluation, SubmissionError> {
        let predictions = parse_predictions(blob, self.required_length)?;
        let score = self.scorer.score(&predictions);
        Ok(Evaluation {
            predictions,
            score,
            strategy: self.scorer.strategy(),
        })
    }

    /// Validate, score and append a new record stamped with the current time
    pub fn submit(&self, name: &str, blob: &[u8]) -> Result<SubmissionRecord, SubmissionError> {
        self.submit_at(name, blob, now_in(self.offset))
    }

    /// As [`submit`](Self::submit) with an explicit submission time
    pub fn submit_at(
        &self,
        name: &str,
        blob: &[u8],
        submitted_at: DateTime<FixedOffset>,
    ) -> Result<SubmissionRecord, SubmissionError> {
        let name = validate_name(name).map_err(|e| {
            warn!("Rejected submission with invalid name: {}", e);
            e
        })?;

        let evaluation = self.evaluate(blob).map_err(|e| {
            warn!("Rejected submission from '{}': {}", name, e);
            e
        })?;

        let record = SubmissionRecord {
            name: name.to_string(),
            predictions: evaluation.predictions,
            score: evaluation.score,
            submitted_at: submitted_at.with_timezone(&self.offset),
        };

        let key = self.store.append(&record)?;
        debug!("Stored submission under key {}", key);
        info!(
            "Accepted submission from '{}': {} = {}",
            record.name,
            evaluation.strategy.label(),
            evaluation.strategy.format_score(record.score)
        );

        Ok(record)
    }
}
