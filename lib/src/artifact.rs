//! The persisted bundle: model, feature schema, learned state and policy.
//!
//! The four parts only make sense together, so they are saved and loaded as
//! one file and validated against each other on every construction.

use crate::model::ScoringModel;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::{ColumnPolicy, FeatureSchema, LearnedState, Pipeline};
use crate::serialization::{self, SerializableParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bumped whenever the on-disk layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Everything inference needs, bundled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact<M> {
    version: u32,
    model: M,
    schema: FeatureSchema,
    state: LearnedState,
    policy: ColumnPolicy,
}

impl<M> ModelArtifact<M>
where
    M: ScoringModel + SerializableParams,
{
    /// Bundle the parts, checking that they agree.
    pub fn new(
        model: M,
        schema: FeatureSchema,
        state: LearnedState,
        policy: ColumnPolicy,
    ) -> Result<Self, PreprocessingError> {
        let artifact = Self {
            version: ARTIFACT_FORMAT_VERSION,
            model,
            schema,
            state,
            policy,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), PreprocessingError> {
        if self.version != ARTIFACT_FORMAT_VERSION {
            return Err(PreprocessingError::Serialization(format!(
                "artifact format version {} is not supported (expected {})",
                self.version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if self.schema.is_empty() {
            return Err(PreprocessingError::SchemaMismatch(
                "artifact has no frozen feature schema".to_string(),
            ));
        }
        if self.model.n_features() != self.schema.len() {
            return Err(PreprocessingError::SchemaMismatch(format!(
                "model expects {} features, schema has {}",
                self.model.n_features(),
                self.schema.len()
            )));
        }
        self.model.check_integrity()?;
        self.policy.validate()?;
        self.state.matches(&self.policy)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn state(&self) -> &LearnedState {
        &self.state
    }

    pub fn policy(&self) -> &ColumnPolicy {
        &self.policy
    }

    /// A pipeline configured with the bundled policy.
    pub fn pipeline(&self) -> Result<Pipeline, PreprocessingError> {
        Pipeline::new(self.policy.clone())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        serialization::save_to_file(self, path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), features = self.schema.len(), "saved model artifact");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let artifact: Self = serialization::load_from_file(path.as_ref())?;
        artifact.validate()?;
        tracing::info!(path = %path.as_ref().display(), features = artifact.schema.len(), "loaded model artifact");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Table, Value};
    use crate::model::gbdt::{Node, RegressionTree};
    use crate::model::GradientBoostedTrees;

    fn fitted() -> (FeatureSchema, LearnedState, ColumnPolicy) {
        let policy = ColumnPolicy::new("Adopted").with_one_hot(["Type"]);
        let table = Table::from_rows(
            vec!["Type".into(), "Age".into(), "Adopted".into()],
            vec![
                vec!["Dog".into(), Value::Int(1), "yes".into()],
                vec!["Cat".into(), Value::Int(4), "no".into()],
            ],
        )
        .unwrap();
        let fit = Pipeline::new(policy.clone()).unwrap().fit_transform(table).unwrap();
        (fit.schema, fit.state, policy)
    }

    #[test]
    fn test_model_width_must_match_schema() {
        let (schema, state, policy) = fitted();
        let model = GradientBoostedTrees::new(2, 0.0, Vec::new());
        assert!(matches!(
            ModelArtifact::new(model, schema, state, policy),
            Err(PreprocessingError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_state_must_match_policy() {
        let (schema, state, _) = fitted();
        let other = ColumnPolicy::new("Adopted").with_label(["Type"]);
        let model = GradientBoostedTrees::new(schema.len(), 0.0, Vec::new());
        assert!(matches!(
            ModelArtifact::new(model, schema, state, other),
            Err(PreprocessingError::PolicyValidation(_))
        ));
    }

    fn split_on(feature: usize) -> RegressionTree {
        RegressionTree::from_nodes(vec![
            Node::Split {
                feature,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -0.1 },
            Node::Leaf { value: 0.1 },
        ])
    }

    #[test]
    fn test_split_on_missing_feature_rejected() {
        let (schema, state, policy) = fitted();
        let model = GradientBoostedTrees::new(schema.len(), 0.0, vec![split_on(5)]);
        assert!(matches!(
            ModelArtifact::new(model, schema, state, policy),
            Err(PreprocessingError::Serialization(_))
        ));
    }

    #[test]
    fn test_corrupt_tree_fails_on_load() -> Result<(), Box<dyn std::error::Error>> {
        let (schema, state, policy) = fitted();
        // Built field by field so nothing validates it before it hits disk.
        let corrupt = ModelArtifact {
            version: ARTIFACT_FORMAT_VERSION,
            model: GradientBoostedTrees::new(schema.len(), 0.0, vec![split_on(schema.len())]),
            schema,
            state,
            policy,
        };

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("corrupt.bin");
        serialization::save_to_file(&corrupt, &path)?;

        let loaded = ModelArtifact::<GradientBoostedTrees>::load_from_file(&path);
        assert!(matches!(loaded, Err(PreprocessingError::Serialization(_))));
        Ok(())
    }

    #[test]
    fn test_save_load_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let (schema, state, policy) = fitted();
        let model = GradientBoostedTrees::new(schema.len(), 0.3, Vec::new());
        let artifact = ModelArtifact::new(model, schema, state, policy)?;

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("adoption.bin");
        artifact.save_to_file(&path)?;
        let loaded = ModelArtifact::<GradientBoostedTrees>::load_from_file(&path)?;

        assert_eq!(loaded, artifact);
        assert_eq!(
            loaded.schema().columns(),
            &["Type_Cat", "Type_Dog", "Age"]
        );
        Ok(())
    }
}
