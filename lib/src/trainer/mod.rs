//! Training orchestrator.
//!
//! [`Trainer`] runs the full offline flow on a dataset:
//!
//! 1. fit the encoding pipeline on every row,
//! 2. split into train / validation / test partitions (seeded),
//! 3. optionally rebalance the training partition with SMOTE,
//! 4. boost trees with early stopping on the validation partition,
//! 5. evaluate on the test partition,
//! 6. bundle model, schema, learned state and policy into a [`ModelArtifact`].
//!
//! [`Trainer::cross_validate`] instead scores the configuration with seeded
//! k-fold cross-validation over the training partition and builds no
//! artifact.

use crate::artifact::ModelArtifact;
use crate::dataset::{DataSource, Table};
use crate::model::{BoosterParams, GradientBoostedTrees, ScoringModel};
use crate::preprocessing::{ColumnPolicy, Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub mod booster;
pub mod early_stopping;
pub mod error;
pub mod metrics;
pub mod smote;
pub mod split;

pub use booster::{boost, BoostedModel, EvalSet};
pub use early_stopping::EarlyStopping;
pub use error::TrainingError;
pub use metrics::{log_loss, ClassificationMetrics, ConfusionCounts};
pub use smote::Smote;
pub use split::{k_fold, take_rows, train_val_test_split, Split};

/// Settings of a training run.
///
/// Defaults:
/// - `test_fraction`: 0.2 of all rows
/// - `validation_fraction`: 0.2 of the remainder
/// - `random_seed`: 42
/// - `smote`: disabled (5 neighbours when enabled)
/// - `early_stopping_rounds`: 10
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_fraction: f64,
    pub validation_fraction: f64,
    pub random_seed: u64,
    pub smote: bool,
    pub smote_neighbors: usize,
    pub booster: BoosterParams,
    /// `None` trains all `booster.n_rounds` trees.
    pub early_stopping_rounds: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            validation_fraction: 0.2,
            random_seed: 42,
            smote: false,
            smote_neighbors: 5,
            booster: BoosterParams::default(),
            early_stopping_rounds: Some(10),
        }
    }
}

impl TrainingConfig {
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = fraction;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_smote(mut self, enabled: bool) -> Self {
        self.smote = enabled;
        self
    }

    pub fn with_smote_neighbors(mut self, k: usize) -> Self {
        self.smote_neighbors = k;
        self
    }

    pub fn with_booster(mut self, booster: BoosterParams) -> Self {
        self.booster = booster;
        self
    }

    pub fn with_early_stopping_rounds(mut self, rounds: Option<usize>) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        for (name, fraction) in [
            ("test_fraction", self.test_fraction),
            ("validation_fraction", self.validation_fraction),
        ] {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(TrainingError::InvalidConfig(format!(
                    "{} must lie in (0, 1), got {}",
                    name, fraction
                )));
            }
        }
        if self.smote && self.smote_neighbors == 0 {
            return Err(TrainingError::InvalidConfig(
                "smote_neighbors must be positive".to_string(),
            ));
        }
        if self.early_stopping_rounds == Some(0) {
            return Err(TrainingError::InvalidConfig(
                "early_stopping_rounds must be positive".to_string(),
            ));
        }
        self.booster.validate()
    }
}

/// What a training run produced.
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact<GradientBoostedTrees>,
    /// Evaluation on the held-out test partition.
    pub metrics: ClassificationMetrics,
    pub split: Split,
    /// Zero-based best round under early stopping.
    pub best_round: Option<usize>,
}

/// Held-out evaluation of every fold of a cross-validation run.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossValidation {
    pub folds: Vec<ClassificationMetrics>,
}

impl CrossValidation {
    pub fn f1_scores(&self) -> Vec<f64> {
        self.folds.iter().map(|m| m.f1).collect()
    }

    pub fn mean_f1(&self) -> f64 {
        if self.folds.is_empty() {
            return 0.0;
        }
        self.folds.iter().map(|m| m.f1).sum::<f64>() / self.folds.len() as f64
    }
}

/// Runs the training flow for one policy and configuration.
#[derive(Clone, Debug)]
pub struct Trainer {
    pipeline: Pipeline,
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(policy: ColumnPolicy, config: TrainingConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        Ok(Self {
            pipeline: Pipeline::new(policy)?,
            config,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn policy(&self) -> &ColumnPolicy {
        self.pipeline.policy()
    }

    /// Train on an in-memory table.
    pub fn train(&self, table: Table) -> Result<TrainingOutcome, TrainingError> {
        let config = &self.config;
        let fit = self.pipeline.fit_transform(table)?;
        let features = fit.matrix.values();

        let split = train_val_test_split(
            fit.matrix.n_rows(),
            config.test_fraction,
            config.validation_fraction,
            config.random_seed,
        )?;
        let (mut x_train, mut y_train) = take_rows(features, &fit.target, &split.train);
        let (x_val, y_val) = take_rows(features, &fit.target, &split.validation);
        let (x_test, y_test) = take_rows(features, &fit.target, &split.test);

        if config.smote {
            let smote = Smote::new(config.smote_neighbors, config.random_seed);
            (x_train, y_train) = smote.resample(x_train.view(), &y_train)?;
        }

        let boosted = boost(
            &config.booster,
            EvalSet::new(x_train.view(), &y_train),
            Some(EvalSet::new(x_val.view(), &y_val)),
            config.early_stopping_rounds,
        )?;

        let proba = boosted.model.predict_proba(x_test.view());
        let metrics = ClassificationMetrics::from_probabilities(&y_test, &proba)?;
        tracing::info!(
            f1 = metrics.f1,
            accuracy = metrics.accuracy,
            recall = metrics.recall,
            precision = metrics.precision,
            trees = boosted.model.n_trees(),
            "evaluated on test partition"
        );

        let artifact = ModelArtifact::new(
            boosted.model,
            fit.schema,
            fit.state,
            self.pipeline.policy().clone(),
        )?;
        Ok(TrainingOutcome {
            artifact,
            metrics,
            split,
            best_round: boosted.best_round,
        })
    }

    /// Seeded k-fold cross-validation over the training partition.
    ///
    /// The test and validation partitions are left out entirely. Each fold
    /// trains the full number of rounds (no early stopping) on the other
    /// folds, rebalanced with SMOTE when enabled, and is scored on itself.
    pub fn cross_validate(&self, table: Table, k: usize) -> Result<CrossValidation, TrainingError> {
        let config = &self.config;
        let fit = self.pipeline.fit_transform(table)?;
        let features = fit.matrix.values();

        let split = train_val_test_split(
            fit.matrix.n_rows(),
            config.test_fraction,
            config.validation_fraction,
            config.random_seed,
        )?;
        let folds = k_fold(&split.train, k, config.random_seed)?;
        tracing::info!(folds = k, rows = split.train.len(), "starting cross-validation");

        let mut results = Vec::with_capacity(k);
        for (fold, held_out) in folds.iter().enumerate() {
            let held: HashSet<usize> = held_out.iter().copied().collect();
            let fit_rows: Vec<usize> = split
                .train
                .iter()
                .copied()
                .filter(|r| !held.contains(r))
                .collect();

            let (mut x_fit, mut y_fit) = take_rows(features, &fit.target, &fit_rows);
            let (x_held, y_held) = take_rows(features, &fit.target, held_out);
            if config.smote {
                let smote = Smote::new(config.smote_neighbors, config.random_seed);
                (x_fit, y_fit) = smote.resample(x_fit.view(), &y_fit)?;
            }

            let boosted = boost(&config.booster, EvalSet::new(x_fit.view(), &y_fit), None, None)?;
            let proba = boosted.model.predict_proba(x_held.view());
            let metrics = ClassificationMetrics::from_probabilities(&y_held, &proba)?;
            tracing::info!(
                fold,
                f1 = metrics.f1,
                accuracy = metrics.accuracy,
                recall = metrics.recall,
                "cross-validation fold"
            );
            results.push(metrics);
        }

        let cv = CrossValidation { folds: results };
        tracing::info!(f1_scores = ?cv.f1_scores(), mean_f1 = cv.mean_f1(), "cross-validation finished");
        Ok(cv)
    }

    /// Fetch the dataset from `source` and train on it.
    pub fn train_from_source<S: DataSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<TrainingOutcome, TrainingError> {
        let table = source.fetch()?;
        self.train(table)
    }

    /// Fetch, train, and persist the artifact bundle to `artifact_path`.
    pub fn run<S: DataSource + ?Sized, P: AsRef<Path>>(
        &self,
        source: &S,
        artifact_path: P,
    ) -> Result<TrainingOutcome, TrainingError> {
        let outcome = self.train_from_source(source)?;
        outcome.artifact.save_to_file(artifact_path)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.validation_fraction, 0.2);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.early_stopping_rounds, Some(10));
        assert!(!config.smote);
        assert_eq!(config.booster.max_depth, 4);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_validation() {
        assert!(TrainingConfig::default()
            .with_test_fraction(0.0)
            .validate()
            .is_err());
        assert!(TrainingConfig::default()
            .with_smote(true)
            .with_smote_neighbors(0)
            .validate()
            .is_err());
        assert!(TrainingConfig::default()
            .with_smote(false)
            .with_smote_neighbors(0)
            .validate()
            .is_ok());
        assert!(TrainingConfig::default()
            .with_early_stopping_rounds(Some(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_from_json_partial() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"random_seed": 7, "booster": {"max_depth": 3}}"#).unwrap();
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.booster.max_depth, 3);
        assert_eq!(config.booster.learning_rate, 0.1);
        assert!(!config.smote);
    }

    #[test]
    fn test_mean_f1() {
        let metrics = |f1: f64| ClassificationMetrics {
            f1,
            ..ClassificationMetrics::from_probabilities(&[1.0], &[0.9]).unwrap()
        };
        let cv = CrossValidation {
            folds: vec![metrics(0.5), metrics(1.0)],
        };
        assert_eq!(cv.f1_scores(), vec![0.5, 1.0]);
        assert_eq!(cv.mean_f1(), 0.75);
        assert_eq!(CrossValidation { folds: Vec::new() }.mean_f1(), 0.0);
    }

    #[test]
    fn test_trainer_rejects_invalid_policy() {
        let policy = ColumnPolicy::new("Adopted").with_one_hot(["Adopted"]);
        assert!(matches!(
            Trainer::new(policy, TrainingConfig::default()),
            Err(TrainingError::Preprocessing(_))
        ));
    }
}
