//! Fitting of [`GradientBoostedTrees`] with the logistic objective.
//!
//! Each round computes per-row gradients and hessians of the log loss,
//!
//! ```text
//! g = p - y
//! h = max(p * (1 - p), eps)
//! ```
//!
//! and grows one depth-limited tree by exact greedy search over sorted
//! feature values. Split thresholds are midpoints between adjacent distinct
//! values.

use super::early_stopping::EarlyStopping;
use super::error::TrainingError;
use super::metrics::log_loss;
use crate::model::gbdt::{logit, sigmoid};
use crate::model::{BoosterParams, GradientBoostedTrees, Node, RegressionTree};
use ndarray::ArrayView2;

const HESSIAN_EPS: f64 = 1e-16;

/// A labelled matrix view.
#[derive(Clone, Copy, Debug)]
pub struct EvalSet<'a> {
    pub features: ArrayView2<'a, f64>,
    pub target: &'a [f64],
}

impl<'a> EvalSet<'a> {
    pub fn new(features: ArrayView2<'a, f64>, target: &'a [f64]) -> Self {
        Self { features, target }
    }
}

/// Result of a boosting run.
#[derive(Clone, Debug)]
pub struct BoostedModel {
    pub model: GradientBoostedTrees,
    /// Zero-based round of the best validation loss, if validation was used.
    pub best_round: Option<usize>,
    pub best_validation_loss: Option<f64>,
}

impl BoosterParams {
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.n_rounds == 0 {
            return Err(TrainingError::InvalidConfig("n_rounds must be positive".to_string()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TrainingError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.reg_lambda < 0.0 || self.min_child_weight < 0.0 || self.min_split_gain < 0.0 {
            return Err(TrainingError::InvalidConfig(
                "reg_lambda, min_child_weight and min_split_gain must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Train a boosted ensemble on `train`.
///
/// With `validation` and `early_stopping_rounds`, training stops once the
/// validation log loss has not improved for that many rounds and the model is
/// truncated to its best round.
pub fn boost(
    params: &BoosterParams,
    train: EvalSet<'_>,
    validation: Option<EvalSet<'_>>,
    early_stopping_rounds: Option<usize>,
) -> Result<BoostedModel, TrainingError> {
    params.validate()?;
    check_set(&train, train.features.ncols(), "training")?;
    if let Some(val) = &validation {
        check_set(val, train.features.ncols(), "validation")?;
    }

    let positive_rate = train.target.iter().sum::<f64>() / train.target.len() as f64;
    let base_score = logit(positive_rate);
    let mut model = GradientBoostedTrees::new(train.features.ncols(), base_score, Vec::new());

    let mut train_margin = vec![base_score; train.target.len()];
    let mut val_margin = validation
        .as_ref()
        .map(|v| vec![base_score; v.target.len()]);
    let mut monitor = match (&validation, early_stopping_rounds) {
        (Some(_), Some(patience)) => Some(EarlyStopping::new(patience, false)),
        _ => None,
    };

    let grower = TreeGrower {
        params,
        features: train.features,
    };
    let mut grad = vec![0.0; train.target.len()];
    let mut hess = vec![0.0; train.target.len()];

    for round in 0..params.n_rounds {
        for (i, (&margin, &y)) in train_margin.iter().zip(train.target).enumerate() {
            let p = sigmoid(margin);
            grad[i] = p - y;
            hess[i] = (p * (1.0 - p)).max(HESSIAN_EPS);
        }

        let tree = grower.grow(&grad, &hess);
        for (i, row) in train.features.rows().into_iter().enumerate() {
            train_margin[i] += tree.predict_row(row);
        }

        let mut val_loss = None;
        if let (Some(val), Some(margin)) = (&validation, val_margin.as_mut()) {
            for (i, row) in val.features.rows().into_iter().enumerate() {
                margin[i] += tree.predict_row(row);
            }
            let proba: Vec<f64> = margin.iter().map(|&m| sigmoid(m)).collect();
            val_loss = Some(log_loss(val.target, &proba));
        }
        model.push_tree(tree);

        tracing::debug!(round, val_logloss = ?val_loss, "boosting round");

        if let (Some(monitor), Some(loss)) = (monitor.as_mut(), val_loss) {
            if monitor.should_stop(loss) {
                tracing::info!(
                    round,
                    best_round = monitor.best_round(),
                    "early stopping: validation logloss stopped improving"
                );
                break;
            }
        }
    }

    let (best_round, best_validation_loss) = match &monitor {
        Some(m) => (Some(m.best_round()), m.best_value()),
        None => (None, None),
    };
    if let Some(best) = best_round {
        model.truncate(best + 1);
    }
    tracing::info!(trees = model.n_trees(), base_score, "boosting finished");

    Ok(BoostedModel {
        model,
        best_round,
        best_validation_loss,
    })
}

fn check_set(set: &EvalSet<'_>, n_features: usize, what: &str) -> Result<(), TrainingError> {
    if set.target.is_empty() {
        return Err(TrainingError::InsufficientData(format!("{} set is empty", what)));
    }
    if set.features.nrows() != set.target.len() {
        return Err(TrainingError::InvalidConfig(format!(
            "{} set has {} rows but {} labels",
            what,
            set.features.nrows(),
            set.target.len()
        )));
    }
    if set.features.ncols() != n_features {
        return Err(TrainingError::InvalidConfig(format!(
            "{} set has {} features, expected {}",
            what,
            set.features.ncols(),
            n_features
        )));
    }
    if let Some(bad) = set.target.iter().find(|&&y| y != 0.0 && y != 1.0) {
        return Err(TrainingError::InvalidConfig(format!(
            "{} labels must be 0 or 1, found {}",
            what, bad
        )));
    }
    Ok(())
}

struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

struct TreeGrower<'p, 'a> {
    params: &'p BoosterParams,
    features: ArrayView2<'a, f64>,
}

impl TreeGrower<'_, '_> {
    fn grow(&self, grad: &[f64], hess: &[f64]) -> RegressionTree {
        let mut nodes = Vec::new();
        let rows: Vec<usize> = (0..grad.len()).collect();
        self.grow_node(&mut nodes, rows, 0, grad, hess);
        RegressionTree::from_nodes(nodes)
    }

    /// Append the subtree for `rows` to `nodes` and return its root index.
    fn grow_node(
        &self,
        nodes: &mut Vec<Node>,
        rows: Vec<usize>,
        depth: usize,
        grad: &[f64],
        hess: &[f64],
    ) -> usize {
        let idx = nodes.len();
        let g: f64 = rows.iter().map(|&r| grad[r]).sum();
        let h: f64 = rows.iter().map(|&r| hess[r]).sum();
        let leaf = Node::Leaf {
            value: self.params.learning_rate * self.params.leaf_weight(g, h),
        };

        let candidate = if depth < self.params.max_depth && rows.len() >= 2 {
            self.best_split(&rows, grad, hess)
        } else {
            None
        };
        let Some(split) = candidate else {
            nodes.push(leaf);
            return idx;
        };

        tracing::trace!(feature = split.feature, gain = split.gain, depth, "split node");
        nodes.push(leaf);
        let left = self.grow_node(nodes, split.left, depth + 1, grad, hess);
        let right = self.grow_node(nodes, split.right, depth + 1, grad, hess);
        nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], grad: &[f64], hess: &[f64]) -> Option<Candidate> {
        let g_total: f64 = rows.iter().map(|&r| grad[r]).sum();
        let h_total: f64 = rows.iter().map(|&r| hess[r]).sum();
        let mut best: Option<(usize, f64, f64)> = None;

        let mut order = rows.to_vec();
        for feature in 0..self.features.ncols() {
            let column = self.features.column(feature);
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

            let (mut gl, mut hl) = (0.0, 0.0);
            for pair in order.windows(2) {
                let (r, next) = (pair[0], pair[1]);
                gl += grad[r];
                hl += hess[r];
                let (lo, hi) = (column[r], column[next]);
                if lo == hi {
                    continue;
                }
                let (gr, hr) = (g_total - gl, h_total - hl);
                if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                    continue;
                }
                let gain = self.params.split_gain((gl, hl), (gr, hr));
                if gain > 0.0 && best.map_or(true, |(_, _, g)| gain > g) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid > lo { mid } else { hi };
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let (left, right) = rows
            .iter()
            .partition(|&&r| self.features[[r, feature]] < threshold);
        Some(Candidate {
            feature,
            threshold,
            gain,
            left,
            right,
        })
    }
}
