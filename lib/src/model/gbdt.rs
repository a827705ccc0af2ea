//! Gradient-boosted decision trees for binary classification.
//!
//! The model is an additive ensemble of regression trees over the logit:
//!
//! ```text
//! margin(x) = base_score + sum_t tree_t(x)
//! p(x)      = 1 / (1 + exp(-margin(x)))
//! ```
//!
//! Leaf values already include the learning rate, so prediction is a plain
//! sum. Trees route a row left when `x[feature] < threshold`.

use super::ScoringModel;
use crate::preprocessing::error::PreprocessingError;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the boosting procedure.
///
/// Defaults:
/// - `n_rounds`: 100
/// - `learning_rate`: 0.1
/// - `max_depth`: 4
/// - `reg_lambda`: 1.0
/// - `min_child_weight`: 1.0
/// - `min_split_gain`: 0.0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Maximum number of trees.
    pub n_rounds: usize,
    /// Shrinkage applied to every leaf.
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2 regularization on leaf weights (lambda).
    pub reg_lambda: f64,
    /// Minimum hessian sum in each child of a split.
    pub min_child_weight: f64,
    /// Minimum gain for a split to be kept (gamma).
    pub min_split_gain: f64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            max_depth: 4,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            min_split_gain: 0.0,
        }
    }
}

impl BoosterParams {
    pub fn with_n_rounds(mut self, n_rounds: usize) -> Self {
        self.n_rounds = n_rounds;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_reg_lambda(mut self, reg_lambda: f64) -> Self {
        self.reg_lambda = reg_lambda;
        self
    }

    pub fn with_min_child_weight(mut self, min_child_weight: f64) -> Self {
        self.min_child_weight = min_child_weight;
        self
    }

    pub fn with_min_split_gain(mut self, min_split_gain: f64) -> Self {
        self.min_split_gain = min_split_gain;
        self
    }

    /// Split gain, XGBoost formula:
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    pub fn split_gain(&self, left: (f64, f64), right: (f64, f64)) -> f64 {
        let (gl, hl) = left;
        let (gr, hr) = right;
        let (gp, hp) = (gl + gr, hl + hr);
        0.5 * (self.score(gl, hl) + self.score(gr, hr) - self.score(gp, hp)) - self.min_split_gain
    }

    /// Newton step for a leaf, before shrinkage.
    pub fn leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        -grad_sum / (hess_sum + self.reg_lambda)
    }

    fn score(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        grad_sum * grad_sum / (hess_sum + self.reg_lambda)
    }
}

/// A node of a regression tree; children are indices into the node array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A binary regression tree stored as a flat node array, root at index 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Check that every split reads an existing feature and points forward to
    /// children inside the node array, so traversal always terminates.
    pub fn check_structure(&self, n_features: usize) -> Result<(), String> {
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {} has non-finite value {}", idx, value));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "split {} reads feature {} of {}",
                            idx, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("split {} has a NaN threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!(
                                "split {} points to node {} of {}",
                                idx,
                                child,
                                self.nodes.len()
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `row`. An empty tree contributes nothing.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                None => return 0.0,
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] < *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Trained boosted ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    n_features: usize,
    /// Initial margin: logit of the training positive rate.
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    pub(crate) fn new(n_features: usize, base_score: f64, trees: Vec<RegressionTree>) -> Self {
        Self {
            n_features,
            base_score,
            trees,
        }
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Keep only the first `n_trees` trees.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    pub(crate) fn push_tree(&mut self, tree: RegressionTree) {
        self.trees.push(tree);
    }

    /// Raw logit for each row.
    pub fn predict_margin(&self, features: ArrayView2<'_, f64>) -> Vec<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .fold(self.base_score, |acc, tree| acc + tree.predict_row(row))
            })
            .collect()
    }
}

impl ScoringModel for GradientBoostedTrees {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn check_integrity(&self) -> Result<(), PreprocessingError> {
        if !self.base_score.is_finite() {
            return Err(PreprocessingError::Serialization(format!(
                "base score {} is not finite",
                self.base_score
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_structure(self.n_features).map_err(|msg| {
                PreprocessingError::Serialization(format!("tree {}: {}", i, msg))
            })?;
        }
        Ok(())
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Vec<f64> {
        self.predict_margin(features)
            .into_iter()
            .map(sigmoid)
            .collect()
    }
}

#[inline]
pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logit of a probability clipped away from 0 and 1.
pub(crate) fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-6, 1.0 - 1e-6);
    (p / (1.0 - p)).ln()
}
