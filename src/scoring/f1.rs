//! Support-weighted multi-class F1
//!
//! Matches scikit-learn's `f1_score(y_true, y_pred, average="weighted")` with
//! `zero_division=0`: labels are the union of both vectors, and each class F1
//! is weighted by its support in `y_true`.

use super::{Scorer, ScoringStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-class precision, recall and F1
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub label: i64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Occurrences of the label in the ground truth
    pub support: usize,
}

#[derive(Default)]
struct ClassCounts {
    true_positives: usize,
    predicted: usize,
    support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-class breakdown, ordered by label.
///
/// Pairs beyond the shorter of the two slices are ignored.
pub fn classification_report(y_true: &[i64], y_pred: &[i64]) -> Vec<ClassReport> {
    let mut counts: BTreeMap<i64, ClassCounts> = BTreeMap::new();
    for (&truth, &pred) in y_true.iter().zip(y_pred) {
        counts.entry(truth).or_default().support += 1;
        counts.entry(pred).or_default().predicted += 1;
        if truth == pred {
            counts.entry(truth).or_default().true_positives += 1;
        }
    }

    counts
        .into_iter()
        .map(|(label, c)| {
            let precision = ratio(c.true_positives, c.predicted);
            let recall = ratio(c.true_positives, c.support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassReport {
                label,
                precision,
                recall,
                f1,
                support: c.support,
            }
        })
        .collect()
}

/// Weighted F1 in [0, 1]; 0 when there is no ground truth
pub fn weighted_f1(y_true: &[i64], y_pred: &[i64]) -> f64 {
    let report = classification_report(y_true, y_pred);
    let total_support: usize = report.iter().map(|c| c.support).sum();
    if total_support == 0 {
        return 0.0;
    }
    let weighted: f64 = report.iter().map(|c| c.f1 * c.support as f64).sum();
    weighted / total_support as f64
}

pub struct WeightedF1Scorer {
    y_true: Vec<i64>,
}

impl WeightedF1Scorer {
    pub fn new(y_true: Vec<i64>) -> Self {
        Self { y_true }
    }
}

impl Scorer for WeightedF1Scorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::WeightedF1
    }

    fn score(&self, predictions: &[i64]) -> f64 {
        debug_assert_eq!(predictions.len(), self.y_true.len());
        weighted_f1(&self.y_true, predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_hand_computed_weighted_f1() {
        // class 0: tp=2 fp=1 fn=0 -> P=2/3 R=1 F1=0.8, support 2
        // class 1: tp=1 fp=0 fn=1 -> P=1 R=1/2 F1=2/3, support 2
        let score = weighted_f1(&[0, 1, 1, 0], &[0, 1, 0, 0]);
        let expected = (2.0 * 0.8 + 2.0 * (2.0 / 3.0)) / 4.0;
        assert!(approx(score, expected), "got {}", score);
    }

    #[test]
    fn test_weighting_differs_from_macro_average() {
        // class 0 support 3, class 1 support 1
        let y_true = [0, 0, 0, 1];
        let y_pred = [0, 0, 0, 0];
        let report = classification_report(&y_true, &y_pred);
        // class 0: P=3/4 R=1 F1=6/7; class 1: never predicted -> F1=0
        assert!(approx(report[0].f1, 6.0 / 7.0));
        assert_eq!(report[1].f1, 0.0);

        let weighted = weighted_f1(&y_true, &y_pred);
        let macro_avg = (report[0].f1 + report[1].f1) / 2.0;
        assert!(approx(weighted, 3.0 * (6.0 / 7.0) / 4.0));
        assert!(!approx(weighted, macro_avg));
    }

    #[test]
    fn test_perfect_and_worst_predictions() {
        let y_true = [7, 2, 1, 0, 4, 1];
        assert_eq!(weighted_f1(&y_true, &y_true), 1.0);
        assert_eq!(weighted_f1(&y_true, &[9, 9, 9, 9, 9, 9]), 0.0);
    }

    #[test]
    fn test_label_only_in_predictions_has_no_weight() {
        let report = classification_report(&[1, 1], &[1, 5]);
        let unseen = report.iter().find(|c| c.label == 5).unwrap();
        assert_eq!(unseen.support, 0);
        assert_eq!(unseen.f1, 0.0);

        // class 1: P=1 R=1/2 F1=2/3, the only weighted class
        assert!(approx(weighted_f1(&[1, 1], &[1, 5]), 2.0 / 3.0));
    }

    #[test]
    fn test_report_is_ordered_by_label() {
        let report = classification_report(&[3, 1, 2], &[1, 2, 3]);
        let labels: Vec<i64> = report.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_ground_truth() {
        assert_eq!(weighted_f1(&[], &[]), 0.0);
    }
}
