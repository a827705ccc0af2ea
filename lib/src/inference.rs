//! Inference orchestrator: raw records in, adoption labels out.
//!
//! ```text
//! record -> transform_for_inference -> align -> score -> threshold -> label
//! ```
//!
//! Every step fails closed: if any of them errors, no label is produced.

use crate::artifact::ModelArtifact;
use crate::dataset::Table;
use crate::model::ScoringModel;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::{EncodedMatrix, FeatureAligner, Pipeline};
use crate::serialization::SerializableParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Predictor settings.
///
/// Defaults: `threshold` 0.4, labels `"Adopted"` / `"Not Adopted"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Probabilities at or above this value are classified as adopted.
    pub threshold: f64,
    pub positive_label: String,
    pub negative_label: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            positive_label: "Adopted".to_string(),
            negative_label: "Not Adopted".to_string(),
        }
    }
}

impl PredictorConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_labels(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.positive_label = positive.into();
        self.negative_label = negative.into();
        self
    }

    pub fn validate(&self) -> Result<(), PreprocessingError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Outcome for one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    Adopted,
    NotAdopted,
}

impl Prediction {
    pub fn is_adopted(self) -> bool {
        self == Prediction::Adopted
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Adopted => f.write_str("Adopted"),
            Prediction::NotAdopted => f.write_str("Not Adopted"),
        }
    }
}

/// `p >= threshold` is adopted; the boundary is inclusive.
pub fn classify(probability: f64, threshold: f64) -> Prediction {
    if probability >= threshold {
        Prediction::Adopted
    } else {
        Prediction::NotAdopted
    }
}

/// Loaded model bundle ready to score records.
///
/// Holds only immutable state, so a single predictor can be shared across
/// threads (for example behind an `Arc`).
#[derive(Clone, Debug)]
pub struct Predictor<M> {
    artifact: ModelArtifact<M>,
    pipeline: Pipeline,
    config: PredictorConfig,
}

impl<M> Predictor<M>
where
    M: ScoringModel + SerializableParams,
{
    pub fn new(artifact: ModelArtifact<M>, config: PredictorConfig) -> Result<Self, PreprocessingError> {
        config.validate()?;
        let pipeline = artifact.pipeline()?;
        Ok(Self {
            artifact,
            pipeline,
            config,
        })
    }

    /// Load an artifact bundle from disk.
    pub fn load<P: AsRef<Path>>(path: P, config: PredictorConfig) -> Result<Self, PreprocessingError> {
        Self::new(ModelArtifact::load_from_file(path)?, config)
    }

    pub fn artifact(&self) -> &ModelArtifact<M> {
        &self.artifact
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// The configured text for a prediction.
    pub fn label(&self, prediction: Prediction) -> &str {
        match prediction {
            Prediction::Adopted => &self.config.positive_label,
            Prediction::NotAdopted => &self.config.negative_label,
        }
    }

    /// Encode raw records and align them to the frozen schema.
    pub fn encode(&self, table: Table) -> Result<EncodedMatrix, PreprocessingError> {
        let encoded = self
            .pipeline
            .transform_for_inference(table, self.artifact.state())?;
        let (aligned, report) = FeatureAligner::new(self.artifact.schema())?.align(&encoded)?;
        if !report.zero_filled.is_empty() {
            tracing::debug!(zero_filled = ?report.zero_filled, "zero-filled absent features");
        }
        Ok(aligned)
    }

    /// Adoption probability for each record.
    pub fn predict_proba(&self, table: Table) -> Result<Vec<f64>, PreprocessingError> {
        let features = self.encode(table)?;
        let model = self.artifact.model();
        if features.n_cols() != model.n_features() {
            return Err(PreprocessingError::SchemaMismatch(format!(
                "aligned matrix has {} columns, model expects {}",
                features.n_cols(),
                model.n_features()
            )));
        }

        let proba = model.predict_proba(features.values());
        if proba.len() != features.n_rows() {
            return Err(PreprocessingError::SchemaMismatch(format!(
                "model returned {} scores for {} rows",
                proba.len(),
                features.n_rows()
            )));
        }
        if let Some(bad) = proba.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "model returned a probability outside [0, 1]: {}",
                bad
            )));
        }
        Ok(proba)
    }

    /// Classify each record.
    pub fn predict_batch(&self, table: Table) -> Result<Vec<Prediction>, PreprocessingError> {
        let proba = self.predict_proba(table)?;
        let predictions: Vec<Prediction> = proba
            .iter()
            .map(|&p| classify(p, self.config.threshold))
            .collect();
        tracing::info!(
            records = predictions.len(),
            adopted = predictions.iter().filter(|p| p.is_adopted()).count(),
            threshold = self.config.threshold,
            "scored batch"
        );
        Ok(predictions)
    }

    /// Classify a single flat record of raw columns.
    pub fn predict_record(
        &self,
        record: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Prediction, PreprocessingError> {
        let table = Table::from_json_records(std::slice::from_ref(record))?;
        let proba = self.predict_proba(table)?;
        let p = proba.first().copied().ok_or_else(|| {
            PreprocessingError::EmptyData("model returned no score for the record".to_string())
        })?;
        let prediction = classify(p, self.config.threshold);
        tracing::info!(probability = p, prediction = %prediction, "scored record");
        Ok(prediction)
    }

    /// Classify a JSON object and return the configured label text.
    pub fn predict_json(&self, json: &str) -> Result<String, PreprocessingError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(record) = value else {
            return Err(PreprocessingError::InvalidParameter(
                "inference input must be a JSON object".to_string(),
            ));
        };
        let prediction = self.predict_record(&record)?;
        Ok(self.label(prediction).to_string())
    }
}
