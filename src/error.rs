//! Error types for submissions, storage and configuration

use thiserror::Error;

/// Reasons a submission is rejected.
///
/// Every variant except `Store` is a validation failure caused by the uploaded
/// file or the participant name; its `Display` text is shown to the participant.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("could not read the file as CSV: {0}")]
    Parse(String),

    #[error("invalid columns {found:?}: the file needs exactly two columns 'index' and 'target'")]
    Schema { found: Vec<String> },

    #[error("wrong number of rows: expected exactly {expected}, found {actual}")]
    Length { expected: usize, actual: usize },

    #[error("row {row}: target value '{value}' is not an integer label")]
    TypeCoercion { row: usize, value: String },

    #[error("could not store submission: {0}")]
    Store(#[from] StoreError),
}

impl SubmissionError {
    /// True for errors caused by the submitted data rather than the platform
    pub fn is_validation(&self) -> bool {
        !matches!(self, SubmissionError::Store(_))
    }
}

/// Failures of the durable record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<zip::result::ZipError> for StoreError {
    fn from(err: zip::result::ZipError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
