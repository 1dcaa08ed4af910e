//! Challenge Configuration
//!
//! Defines the configuration for one competition round:
//! - Round parameters (scoring strategy, secret reference values, required rows)
//! - Dataset links shown to participants
//! - Submission storage backend
//! - Leaderboard name grouping policy
//! - Server bind address and upload limits
//!
//! Secret reference values only live here. They are handed to the scorer at
//! construction and never serialized into any public view.

use crate::error::ConfigError;
use crate::leaderboard::NamePolicy;
use crate::scoring::ScoringStrategy;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Saudi Arabia (Asia/Riyadh) has no DST, so a fixed offset is exact.
pub const DEFAULT_UTC_OFFSET: &str = "+03:00";

/// Complete challenge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Round parameters
    pub round: RoundConfig,
    /// Dataset download links
    pub links: DatasetLinks,
    /// Submission storage
    pub storage: StorageConfig,
    /// Leaderboard presentation
    pub leaderboard: LeaderboardConfig,
    /// HTTP server
    pub server: ServerConfig,
}

impl ChallengeConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        info!(
            "Loaded config from {:?} (round: {}, metric: {})",
            path,
            config.round.name,
            config.round.scoring_strategy.label()
        );
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ChallengeConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.round.validate()?;
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of one submission round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Display name of the round
    pub name: String,
    /// Which metric scores submissions
    pub scoring_strategy: ScoringStrategy,
    /// Ground truth labels (weighted F1) or secret thresholds (threshold count)
    pub reference_values: Vec<i64>,
    /// Required number of prediction rows; weighted F1 derives it from the ground truth
    pub required_length: Option<usize>,
    /// Fixed zone all submission timestamps are normalized to
    pub utc_offset: String,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            name: "weekly-challenge".to_string(),
            scoring_strategy: ScoringStrategy::WeightedF1,
            reference_values: Vec::new(),
            required_length: None,
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
        }
    }
}

impl RoundConfig {
    /// Resolve the required row count `R`
    pub fn required_length(&self) -> Result<usize, ConfigError> {
        let length = match (self.required_length, self.scoring_strategy) {
            (Some(length), _) => length,
            (None, ScoringStrategy::WeightedF1) => self.reference_values.len(),
            (None, ScoringStrategy::ThresholdCount) => {
                return Err(ConfigError::Invalid(
                    "round.required_length is required for the threshold_count strategy"
                        .to_string(),
                ))
            }
        };
        if length == 0 {
            return Err(ConfigError::Invalid(
                "required length must be at least 1".to_string(),
            ));
        }
        Ok(length)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset.trim().parse::<FixedOffset>().map_err(|e| {
            ConfigError::Invalid(format!("round.utc_offset '{}': {}", self.utc_offset, e))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_values.is_empty() {
            return Err(ConfigError::Invalid(
                "round.reference_values must not be empty".to_string(),
            ));
        }
        let required = self.required_length()?;
        if self.scoring_strategy == ScoringStrategy::WeightedF1
            && self.reference_values.len() != required
        {
            return Err(ConfigError::Invalid(format!(
                "ground truth has {} labels but required_length is {}",
                self.reference_values.len(),
                required
            )));
        }
        self.utc_offset()?;
        Ok(())
    }
}

/// Links to the round's datasets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLinks {
    pub train: Option<String>,
    pub test: Option<String>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One CSV file per submission in a directory
    #[default]
    CsvDir,
    /// One row per submission in a SQLite database file
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory (csv_dir) or database file (sqlite)
    pub path: PathBuf,
    /// Keep the submitted target vector next to the score
    pub store_predictions: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::CsvDir,
            path: PathBuf::from("data").join("submissions"),
            store_predictions: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub name_policy: NamePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F1_ROUND: &str = r#"
        [round]
        name = "week-42"
        scoring_strategy = "weighted_f1"
        reference_values = [0, 1, 1, 0]

        [links]
        train = "https://example.com/train.csv"

        [storage]
        backend = "sqlite"
        path = "data/board.db"
    "#;

    #[test]
    fn test_parse_weighted_f1_round() {
        let config = ChallengeConfig::from_toml_str(F1_ROUND).unwrap();
        assert_eq!(config.round.name, "week-42");
        assert_eq!(config.round.scoring_strategy, ScoringStrategy::WeightedF1);
        assert_eq!(config.round.required_length().unwrap(), 4);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.storage.store_predictions);
        assert_eq!(config.leaderboard.name_policy, NamePolicy::Trimmed);
        assert_eq!(
            config.links.train.as_deref(),
            Some("https://example.com/train.csv")
        );
        assert_eq!(config.links.test, None);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_default_offset_is_riyadh() {
        let config = ChallengeConfig::from_toml_str(F1_ROUND).unwrap();
        let offset = config.round.utc_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_threshold_round_needs_explicit_length() {
        let raw = r#"
            [round]
            scoring_strategy = "threshold_count"
            reference_values = [75, 90, 85, 60, 95]
        "#;
        let err = ChallengeConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let raw = r#"
            [round]
            scoring_strategy = "threshold_count"
            reference_values = [75, 90, 85, 60, 95]
            required_length = 3
        "#;
        let config = ChallengeConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.round.required_length().unwrap(), 3);
    }

    #[test]
    fn test_ground_truth_length_must_match() {
        let raw = r#"
            [round]
            scoring_strategy = "weighted_f1"
            reference_values = [0, 1, 1, 0]
            required_length = 5
        "#;
        assert!(ChallengeConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn test_rejects_empty_reference_and_bad_offset() {
        assert!(ChallengeConfig::from_toml_str("[round]\nreference_values = []").is_err());

        let raw = r#"
            [round]
            reference_values = [1]
            utc_offset = "Riyadh"
        "#;
        assert!(ChallengeConfig::from_toml_str(raw).is_err());
    }
}
