use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::forest::ForestError;

/// Held-out performance of a binary classifier, class 1 being positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    /// Compares predictions against the true labels.
    ///
    /// # Errors
    /// `ForestError::ShapeMismatch` if there isn't one prediction per label.
    pub fn new(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<Self, ForestError> {
        if y_true.len() != y_pred.len() {
            return Err(ForestError::ShapeMismatch {
                what: "predictions",
                got: y_pred.len(),
                expected: y_true.len(),
            });
        }

        let mut eval = Self {
            accuracy: 0.0,
            true_positives: 0,
            true_negatives: 0,
            false_positives: 0,
            false_negatives: 0,
        };

        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true) => eval.true_positives += 1,
                (false, false) => eval.true_negatives += 1,
                (false, true) => eval.false_positives += 1,
                (true, false) => eval.false_negatives += 1,
            }
        }

        let total = eval.total();
        if total > 0 {
            eval.accuracy = (eval.true_positives + eval.true_negatives) as f64 / total as f64;
        }
        Ok(eval)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Share of predicted approvals that were approved, `None` when nothing was predicted positive.
    pub fn precision(&self) -> Option<f64> {
        let predicted = self.true_positives + self.false_positives;
        (predicted > 0).then(|| self.true_positives as f64 / predicted as f64)
    }

    /// Share of actual approvals that were found, `None` without positives.
    pub fn recall(&self) -> Option<f64> {
        let actual = self.true_positives + self.false_negatives;
        (actual > 0).then(|| self.true_positives as f64 / actual as f64)
    }
}
