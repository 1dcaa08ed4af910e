//! Scoring system for prediction submissions
//!
//! A round picks one [`ScoringStrategy`]. The strategy builds a [`Scorer`]
//! around the round's secret reference values; scorers are pure functions of
//! (predictions, reference) and are evaluated exactly once per submission.

pub mod f1;
pub mod threshold;

pub use f1::{classification_report, weighted_f1, ClassReport, WeightedF1Scorer};
pub use threshold::{threshold_score, ThresholdScorer};

use serde::{Deserialize, Serialize};

/// Metric used to grade a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Mean percentage of secret thresholds met by each predicted value, in [0, 100]
    ThresholdCount,
    /// Support-weighted multi-class F1 against the ground truth, in [0, 1]
    #[default]
    WeightedF1,
}

impl ScoringStrategy {
    /// Build the scorer for this strategy around the secret reference values
    pub fn scorer(self, reference_values: &[i64]) -> Box<dyn Scorer> {
        match self {
            ScoringStrategy::ThresholdCount => {
                Box::new(ThresholdScorer::new(reference_values.to_vec()))
            }
            ScoringStrategy::WeightedF1 => {
                Box::new(WeightedF1Scorer::new(reference_values.to_vec()))
            }
        }
    }

    /// Human readable metric name
    pub fn label(self) -> &'static str {
        match self {
            ScoringStrategy::ThresholdCount => "Threshold Score",
            ScoringStrategy::WeightedF1 => "Weighted F1 Score",
        }
    }

    /// Upper bound of the score scale
    pub fn max_score(self) -> f64 {
        match self {
            ScoringStrategy::ThresholdCount => 100.0,
            ScoringStrategy::WeightedF1 => 1.0,
        }
    }

    pub fn format_score(self, score: f64) -> String {
        match self {
            ScoringStrategy::ThresholdCount => format!("{:.2}", score),
            ScoringStrategy::WeightedF1 => format!("{:.4}", score),
        }
    }
}

/// A scoring metric bound to its reference values
pub trait Scorer: Send + Sync {
    fn strategy(&self) -> ScoringStrategy;

    /// Score a validated prediction vector.
    ///
    /// Callers guarantee `predictions.len()` equals the round's required length.
    fn score(&self, predictions: &[i64]) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_builds_matching_scorer() {
        let scorer = ScoringStrategy::ThresholdCount.scorer(&[75, 90, 85, 60, 95]);
        assert_eq!(scorer.strategy(), ScoringStrategy::ThresholdCount);
        assert_eq!(scorer.score(&[95, 95, 95, 95, 95]), 100.0);

        let scorer = ScoringStrategy::WeightedF1.scorer(&[0, 1, 1, 0]);
        assert_eq!(scorer.strategy(), ScoringStrategy::WeightedF1);
        assert_eq!(scorer.score(&[0, 1, 1, 0]), 1.0);
    }

    #[test]
    fn test_strategy_serde_names() {
        let strategy: ScoringStrategy = serde_json::from_str("\"threshold_count\"").unwrap();
        assert_eq!(strategy, ScoringStrategy::ThresholdCount);
        assert_eq!(
            serde_json::to_string(&ScoringStrategy::WeightedF1).unwrap(),
            "\"weighted_f1\""
        );
    }

    #[test]
    fn test_format_score() {
        assert_eq!(ScoringStrategy::ThresholdCount.format_score(62.5), "62.50");
        assert_eq!(ScoringStrategy::WeightedF1.format_score(0.73333), "0.7333");
    }
}
