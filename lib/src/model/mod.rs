//! Scoring models.
//!
//! A [`ScoringModel`] maps a schema-ordered feature matrix to adoption
//! probabilities. Models carry only what prediction needs; fitting lives in
//! [`crate::trainer`].

use crate::preprocessing::error::PreprocessingError;
use ndarray::ArrayView2;

pub mod gbdt;

pub use gbdt::{BoosterParams, GradientBoostedTrees, Node, RegressionTree};

/// A trained binary classifier over a fixed feature layout.
pub trait ScoringModel: Send + Sync {
    /// Width of the feature matrix the model was trained on.
    fn n_features(&self) -> usize;

    /// Reject internal state that would make scoring panic or misbehave.
    ///
    /// Called whenever an artifact is built or loaded.
    fn check_integrity(&self) -> Result<(), PreprocessingError> {
        Ok(())
    }

    /// Probability of the positive class for each row, in `[0, 1]`.
    ///
    /// `features` must have exactly [`n_features`](ScoringModel::n_features)
    /// columns in schema order; callers check this before scoring.
    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Vec<f64>;
}
