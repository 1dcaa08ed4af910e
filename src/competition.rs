//! Competition round facade
//!
//! Wires a round's configuration, scorer and store together for the
//! presentation layers (CLI and HTTP server).

use crate::config::{ChallengeConfig, DatasetLinks};
use crate::error::{StoreError, SubmissionError};
use crate::export::build_archive;
use crate::leaderboard::{Leaderboard, NamePolicy};
use crate::record::SubmissionRecord;
use crate::scoring::ScoringStrategy;
use crate::storage::{open_store, SubmissionStore};
use crate::submission::{Evaluation, SubmissionProcessor, REQUIRED_COLUMNS};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Public description of a round. Carries no reference values.
#[derive(Clone, Debug, Serialize)]
pub struct RoundInfo {
    pub name: String,
    pub metric: ScoringStrategy,
    pub metric_label: String,
    pub max_score: f64,
    pub required_length: usize,
    pub columns: Vec<String>,
    pub links: DatasetLinks,
}

/// Leaderboard plus an optional message for participants
#[derive(Clone, Debug)]
pub struct LeaderboardView {
    pub leaderboard: Leaderboard,
    /// Set when the store could not be read completely
    pub notice: Option<String>,
}

pub struct Competition {
    round_name: String,
    links: DatasetLinks,
    name_policy: NamePolicy,
    processor: SubmissionProcessor,
    store: Arc<dyn SubmissionStore>,
}

impl Competition {
    /// Open the configured store and build the round
    pub fn open(config: &ChallengeConfig) -> Result<Self> {
        config.validate()?;
        let store = open_store(&config.storage, config.round.utc_offset()?)?;
        Self::with_store(config, store)
    }

    /// Build the round around an existing store
    pub fn with_store(config: &ChallengeConfig, store: Arc<dyn SubmissionStore>) -> Result<Self> {
        let processor = SubmissionProcessor::new(&config.round, store.clone())?;
        Ok(Self {
            round_name: config.round.name.clone(),
            links: config.links.clone(),
            name_policy: config.leaderboard.name_policy,
            processor,
            store,
        })
    }

    pub fn info(&self) -> RoundInfo {
        let metric = self.processor.strategy();
        RoundInfo {
            name: self.round_name.clone(),
            metric,
            metric_label: metric.label().to_string(),
            max_score: metric.max_score(),
            required_length: self.processor.required_length(),
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            links: self.links.clone(),
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.processor.strategy()
    }

    pub fn submit(&self, name: &str, blob: &[u8]) -> Result<SubmissionRecord, SubmissionError> {
        self.processor.submit(name, blob)
    }

    /// Dry run: validate and score without storing
    pub fn evaluate(&self, blob: &[u8]) -> Result<Evaluation, SubmissionError> {
        self.processor.evaluate(blob)
    }

    /// Recompute the leaderboard from the full store.
    ///
    /// A store failure yields an empty board with a notice instead of an error.
    pub fn leaderboard(&self) -> LeaderboardView {
        match self.store.load_all() {
            Ok(snapshot) => {
                let notice = match snapshot.unreadable.len() {
                    0 => None,
                    n => Some(format!(
                        "{} stored submission(s) could not be read and are not shown.",
                        n
                    )),
                };
                LeaderboardView {
                    leaderboard: Leaderboard::compute(&snapshot.records, self.name_policy),
                    notice,
                }
            }
            Err(e) => {
                error!("Failed to read submissions for leaderboard: {}", e);
                LeaderboardView {
                    leaderboard: Leaderboard::empty(self.name_policy),
                    notice: Some(format!(
                        "The leaderboard is temporarily unavailable ({}). Please try again later.",
                        e
                    )),
                }
            }
        }
    }

    /// Zip archive of every stored record
    pub fn export_archive(&self) -> Result<Vec<u8>, StoreError> {
        build_archive(&self.store.raw_records()?)
    }

    /// Template participants fill in: header plus one row per required prediction
    pub fn example_submission(&self) -> String {
        example_csv(self.processor.required_length())
    }
}

/// `index,target` CSV with `rows` placeholder predictions
pub fn example_csv(rows: usize) -> String {
    let mut out = REQUIRED_COLUMNS.join(",");
    out.push('\n');
    for i in 0..rows {
        out.push_str(&format!("{},0\n", i));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundConfig;
    use crate::storage::{RawRecord, SqliteStore, StoreSnapshot};

    struct FailingStore;

    impl SubmissionStore for FailingStore {
        fn append(&self, _record: &SubmissionRecord) -> Result<String, StoreError> {
            Err(StoreError::Database("disk full".to_string()))
        }

        fn load_all(&self) -> Result<StoreSnapshot, StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )))
        }

        fn raw_records(&self) -> Result<Vec<RawRecord>, StoreError> {
            Err(StoreError::Database("unavailable".to_string()))
        }
    }

    fn config() -> ChallengeConfig {
        ChallengeConfig {
            round: RoundConfig {
                name: "week-1".to_string(),
                scoring_strategy: ScoringStrategy::ThresholdCount,
                reference_values: vec![75, 90, 85, 60, 95],
                required_length: Some(5),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sqlite_competition() -> Competition {
        let offset = config().round.utc_offset().unwrap();
        let store = Arc::new(SqliteStore::in_memory(offset).unwrap());
        Competition::with_store(&config(), store).unwrap()
    }

    #[test]
    fn test_info_hides_reference_values() {
        let competition = sqlite_competition();
        let info = competition.info();
        assert_eq!(info.required_length, 5);
        assert_eq!(info.max_score, 100.0);
        assert_eq!(info.columns, vec!["index", "target"]);

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("reference"));
        assert!(!json.contains("85"));
    }

    #[test]
    fn test_submit_then_rank() {
        let competition = sqlite_competition();
        competition
            .submit("reem", b"index,target\n0,95\n1,95\n2,95\n3,95\n4,95\n")
            .unwrap();
        competition
            .submit("fahad", b"index,target\n0,80\n1,80\n2,80\n3,80\n4,80\n")
            .unwrap();
        assert!(competition.submit("fahad", b"index,target\n0,80\n").is_err());

        let view = competition.leaderboard();
        assert!(view.notice.is_none());
        let top = view.leaderboard.top_scorer().unwrap();
        assert_eq!(top.name, "reem");
        assert_eq!(top.best_score, 100.0);
        assert_eq!(view.leaderboard.get("fahad").unwrap().entries, 1);
    }

    #[test]
    fn test_store_failure_degrades_to_empty_board() {
        let competition = Competition::with_store(&config(), Arc::new(FailingStore)).unwrap();

        let view = competition.leaderboard();
        assert!(view.leaderboard.is_empty());
        assert!(view.leaderboard.top_scorer().is_none());
        assert!(view.notice.unwrap().contains("temporarily unavailable"));

        let err = competition
            .submit("reem", b"index,target\n0,95\n1,95\n2,95\n3,95\n4,95\n")
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Store(_)));
        assert!(competition.export_archive().is_err());
    }

    #[test]
    fn test_example_submission_validates() {
        let competition = sqlite_competition();
        let example = competition.example_submission();
        assert!(example.starts_with("index,target\n0,0\n"));
        let eval = competition.evaluate(example.as_bytes()).unwrap();
        assert_eq!(eval.predictions.len(), 5);
    }
}
