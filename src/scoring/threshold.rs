//! Threshold-count metric
//!
//! Every predicted value is compared against the same secret threshold ladder,
//! not against a per-row ground truth.

use super::{Scorer, ScoringStrategy};

/// Percentage (0-100) of `thresholds` that `target` meets or exceeds.
///
/// Returns 0 for an empty ladder.
pub fn threshold_score(target: i64, thresholds: &[i64]) -> f64 {
    if thresholds.is_empty() {
        return 0.0;
    }
    let met = thresholds.iter().filter(|&&s| target >= s).count();
    met as f64 / thresholds.len() as f64 * 100.0
}

pub struct ThresholdScorer {
    thresholds: Vec<i64>,
}

impl ThresholdScorer {
    pub fn new(thresholds: Vec<i64>) -> Self {
        Self { thresholds }
    }
}

impl Scorer for ThresholdScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::ThresholdCount
    }

    /// Arithmetic mean of the per-row threshold score
    fn score(&self, predictions: &[i64]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let total: f64 = predictions
            .iter()
            .map(|&t| threshold_score(t, &self.thresholds))
            .sum();
        total / predictions.len() as f64
    }
}
