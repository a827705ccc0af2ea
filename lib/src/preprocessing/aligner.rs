//! Reconcile an inference-time matrix with the frozen feature schema.
//!
//! One-hot replay only emits dummies for categories present in the batch, so
//! an encoded record rarely has the exact training layout. The aligner fixes
//! that: schema columns absent from the input become zeros, input columns
//! absent from the schema are dropped, and the result is in schema order.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::pipeline::{EncodedMatrix, FeatureSchema};
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

/// Columns the aligner had to change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Input columns not in the schema.
    pub dropped: Vec<String>,
    /// Schema columns missing from the input, filled with zeros.
    pub zero_filled: Vec<String>,
}

impl AlignmentReport {
    /// True when the input already matched the schema as a set.
    pub fn is_exact(&self) -> bool {
        self.dropped.is_empty() && self.zero_filled.is_empty()
    }
}

/// Aligns encoded matrices to a schema.
#[derive(Clone, Copy, Debug)]
pub struct FeatureAligner<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureAligner<'a> {
    /// Fails with [`PreprocessingError::SchemaMismatch`] on an unfrozen (empty) schema.
    pub fn new(schema: &'a FeatureSchema) -> Result<Self, PreprocessingError> {
        if schema.is_empty() {
            return Err(PreprocessingError::SchemaMismatch(
                "feature schema is empty; fit the pipeline first".to_string(),
            ));
        }
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.schema
    }

    /// Zero-fill, drop and reorder `input` so its columns equal the schema.
    pub fn align(
        &self,
        input: &EncodedMatrix,
    ) -> Result<(EncodedMatrix, AlignmentReport), PreprocessingError> {
        let source: HashMap<&str, usize> = input
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let wanted: HashSet<&str> = self.schema.columns().iter().map(String::as_str).collect();

        let mut report = AlignmentReport::default();
        let values = input.values();
        let mut aligned = Array2::zeros((input.n_rows(), self.schema.len()));
        for (j, name) in self.schema.columns().iter().enumerate() {
            match source.get(name.as_str()) {
                Some(&src) => aligned.column_mut(j).assign(&values.column(src)),
                None => report.zero_filled.push(name.clone()),
            }
        }
        report.dropped = input
            .columns()
            .iter()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();

        if !report.dropped.is_empty() {
            tracing::warn!(dropped = ?report.dropped, "columns not in the feature schema were dropped");
        }
        tracing::debug!(zero_filled = report.zero_filled.len(), "aligned to feature schema");

        let matrix = EncodedMatrix::new(self.schema.columns().to_vec(), aligned)?;
        Ok((matrix, report))
    }
}
