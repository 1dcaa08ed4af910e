//! Weekly AI Challenge submission board
//!
//! Participants upload a CSV of predicted labels for a hidden test set. Each
//! upload is validated, scored against the round's ground truth, appended to a
//! durable store and ranked on a public leaderboard.
//!
//! ## Module Structure
//!
//! - `config`: Round, storage and server configuration (TOML)
//! - `error`: Submission, store and config errors
//! - `scoring/`: Scoring strategies (threshold count, weighted F1)
//! - `submission`: Upload validation and the submit pipeline
//! - `record`: Stored record format, keys and timestamps
//! - `storage/`: Append-only record stores (CSV directory, SQLite)
//! - `leaderboard`: Best-score-per-participant ranking
//! - `export`: Zip archive of stored records
//! - `competition`: Round facade used by the CLI and server
//! - `server/`: HTTP submission board

// ============================================================================
// CORE
// ============================================================================

/// Configuration loading and validation
pub mod config;

/// Error types
pub mod error;

/// Scoring strategies
pub mod scoring;

/// Stored record format
pub mod record;

// ============================================================================
// PIPELINE
// ============================================================================

/// Upload validation and scoring
pub mod submission;

/// Durable record stores
pub mod storage;

/// Leaderboard aggregation
pub mod leaderboard;

/// Bulk export
pub mod export;

/// Round facade
pub mod competition;

/// HTTP server
pub mod server;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use competition::{example_csv, Competition, LeaderboardView, RoundInfo};
pub use config::{ChallengeConfig, RoundConfig, StorageBackend, StorageConfig};
pub use error::{ConfigError, StoreError, SubmissionError};
pub use leaderboard::{
    compute_leaderboard, Leaderboard, LeaderboardEntry, LeaderboardSummary, NamePolicy,
};
pub use record::SubmissionRecord;
pub use scoring::{Scorer, ScoringStrategy};
pub use server::{router, run_server};
pub use storage::{open_store, CsvDirStore, SqliteStore, StoreSnapshot, SubmissionStore};
pub use submission::{Evaluation, SubmissionProcessor};
