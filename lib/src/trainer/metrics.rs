//! Binary classification metrics.
//!
//! Probabilities are turned into hard labels by rounding at 0.5 (`p > 0.5`
//! is positive) before the confusion counts are taken. Ratios with a zero
//! denominator are reported as 0.

use super::error::TrainingError;
use serde::{Deserialize, Serialize};
use std::fmt;

const LOG_LOSS_EPS: f64 = 1e-15;

/// Confusion matrix of a binary classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    /// Count outcomes from 0/1 labels.
    pub fn from_labels(y_true: &[f64], y_pred: &[f64]) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t >= 0.5, p >= 0.5) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Evaluation summary reported after training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub log_loss: f64,
    pub confusion: ConfusionCounts,
}

impl ClassificationMetrics {
    /// Evaluate probabilities against 0/1 ground truth.
    pub fn from_probabilities(y_true: &[f64], proba: &[f64]) -> Result<Self, TrainingError> {
        if y_true.len() != proba.len() {
            return Err(TrainingError::InvalidConfig(format!(
                "{} labels but {} predictions",
                y_true.len(),
                proba.len()
            )));
        }
        if y_true.is_empty() {
            return Err(TrainingError::InsufficientData(
                "cannot evaluate on an empty partition".to_string(),
            ));
        }

        let predicted: Vec<f64> = proba.iter().map(|&p| if p > 0.5 { 1.0 } else { 0.0 }).collect();
        let confusion = ConfusionCounts::from_labels(y_true, &predicted);

        let precision = ratio(
            confusion.true_positive,
            confusion.true_positive + confusion.false_positive,
        );
        let recall = ratio(
            confusion.true_positive,
            confusion.true_positive + confusion.false_negative,
        );
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Ok(Self {
            accuracy: ratio(
                confusion.true_positive + confusion.true_negative,
                confusion.total(),
            ),
            precision,
            recall,
            f1,
            log_loss: log_loss(y_true, proba),
            confusion,
        })
    }
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "F1 {:.4} | accuracy {:.4} | recall {:.4} | precision {:.4} | logloss {:.4}",
            self.f1, self.accuracy, self.recall, self.precision, self.log_loss
        )
    }
}

/// Mean binary cross-entropy, with probabilities clipped to `[eps, 1 - eps]`.
pub fn log_loss(y_true: &[f64], proba: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let total: f64 = y_true
        .iter()
        .zip(proba)
        .map(|(&y, &p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_metrics_known_values() {
        // tp = 2, fp = 1, tn = 1, fn = 1
        let y = [1.0, 1.0, 1.0, 0.0, 0.0];
        let p = [0.9, 0.8, 0.2, 0.7, 0.1];
        let m = ClassificationMetrics::from_probabilities(&y, &p).unwrap();

        assert_eq!(
            m.confusion,
            ConfusionCounts {
                true_positive: 2,
                false_positive: 1,
                true_negative: 1,
                false_negative: 1,
            }
        );
        assert_relative_eq!(m.accuracy, 0.6);
        assert_relative_eq!(m.precision, 2.0 / 3.0);
        assert_relative_eq!(m.recall, 2.0 / 3.0);
        assert_relative_eq!(m.f1, 2.0 / 3.0);
    }

    #[test]
    fn test_half_rounds_to_negative() {
        let m = ClassificationMetrics::from_probabilities(&[1.0], &[0.5]).unwrap();
        assert_eq!(m.confusion.false_negative, 1);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.precision, 0.0);
    }

    #[test]
    fn test_log_loss() {
        assert_relative_eq!(log_loss(&[1.0, 0.0], &[0.5, 0.5]), std::f64::consts::LN_2);
        assert!(log_loss(&[1.0], &[0.0]).is_finite());
        assert!(log_loss(&[1.0], &[0.99]) < log_loss(&[1.0], &[0.6]));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ClassificationMetrics::from_probabilities(&[1.0, 0.0], &[0.3]).is_err());
        assert!(ClassificationMetrics::from_probabilities(&[], &[]).is_err());
    }
}
