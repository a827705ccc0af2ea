//! Values produced by fitting the pipeline.
//!
//! [`LearnedState`] and [`FeatureSchema`] are created once by
//! [`Pipeline::fit_transform`](super::Pipeline::fit_transform) and never
//! mutated afterwards. Both are `Send + Sync` and can be shared by reference
//! between any number of concurrent inference calls.

use crate::preprocessing::encoding::{
    FittedBinaryTargetEncoder, FittedCountEncoder, FittedLabelEncoder, FittedOneHotEncoder,
    FittedOrdinalEncoder,
};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::policy::ColumnPolicy;
use crate::preprocessing::traits::FittedEncoder;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// The learned state of every encoder stage, in stage order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnedState {
    pub(crate) one_hot: Vec<FittedOneHotEncoder>,
    pub(crate) label: Vec<FittedLabelEncoder>,
    pub(crate) ordinal: Vec<FittedOrdinalEncoder>,
    pub(crate) count: Option<FittedCountEncoder>,
    pub(crate) target: FittedBinaryTargetEncoder,
    /// Unassigned numeric columns seen during fit, in table order.
    pub(crate) passthrough: Vec<String>,
}

impl LearnedState {
    pub fn one_hot(&self) -> &[FittedOneHotEncoder] {
        &self.one_hot
    }

    pub fn label(&self) -> &[FittedLabelEncoder] {
        &self.label
    }

    pub fn ordinal(&self) -> &[FittedOrdinalEncoder] {
        &self.ordinal
    }

    pub fn count(&self) -> Option<&FittedCountEncoder> {
        self.count.as_ref()
    }

    pub fn target(&self) -> &FittedBinaryTargetEncoder {
        &self.target
    }

    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Check that this state was fitted under `policy`.
    ///
    /// Every family must cover exactly the columns the policy assigns to it,
    /// and ordinal orders must be identical.
    pub fn matches(&self, policy: &ColumnPolicy) -> Result<(), PreprocessingError> {
        fn same_columns<'a, F: FittedEncoder + 'a>(
            family: &str,
            fitted: impl IntoIterator<Item = &'a F>,
            expected: impl IntoIterator<Item = &'a String>,
        ) -> Result<(), PreprocessingError> {
            let have: BTreeSet<&str> = fitted.into_iter().map(|f| f.column()).collect();
            let want: BTreeSet<&str> = expected.into_iter().map(String::as_str).collect();
            if have != want {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "learned {} state covers {:?}, policy assigns {:?}",
                    family, have, want
                )));
            }
            Ok(())
        }

        same_columns("one-hot", &self.one_hot, &policy.one_hot_columns)?;
        same_columns("label", &self.label, &policy.label_columns)?;
        same_columns("ordinal", &self.ordinal, policy.ordinal_columns.keys())?;
        same_columns("count", self.count.iter(), policy.count_column.iter())?;
        same_columns(
            "target",
            std::iter::once(&self.target),
            std::iter::once(&policy.target_column),
        )?;

        for fitted in &self.ordinal {
            let declared = policy.ordinal_columns.get(fitted.column());
            if declared.map(Vec::as_slice) != Some(fitted.order()) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "ordinal order of `{}` differs from the policy",
                    fitted.column()
                )));
            }
        }
        Ok(())
    }
}

/// Ordered feature column names, frozen at the end of fit.
///
/// An empty schema is an unfrozen one; the aligner refuses it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Freeze a column list. Names must be unique.
    pub fn new(columns: Vec<String>) -> Result<Self, PreprocessingError> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(PreprocessingError::SchemaMismatch(format!(
                "feature `{}` appears twice in the schema",
                dup
            )));
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// A numeric feature matrix with named columns; rows are records.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl EncodedMatrix {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self, PreprocessingError> {
        if columns.len() != values.ncols() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "{} column names for a matrix of width {}",
                columns.len(),
                values.ncols()
            )));
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// A single feature column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.column(idx))
    }

    pub fn into_parts(self) -> (Vec<String>, Array2<f64>) {
        (self.columns, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec!["Age".into(), "Fee".into(), "Age".into()]);
        assert!(matches!(result, Err(PreprocessingError::SchemaMismatch(_))));
    }

    #[test]
    fn test_schema_position() {
        let schema = FeatureSchema::new(vec!["Type_Cat".into(), "Type_Dog".into()]).unwrap();
        assert_eq!(schema.position("Type_Dog"), Some(1));
        assert_eq!(schema.position("Age"), None);
        assert!(FeatureSchema::default().is_empty());
    }

    #[test]
    fn test_encoded_matrix_width_check() {
        let result = EncodedMatrix::new(vec!["a".into()], array![[1.0, 2.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encoded_matrix_column_lookup() {
        let matrix =
            EncodedMatrix::new(vec!["Age".into(), "Fee".into()], array![[1.0, 2.0], [3.0, 4.0]])
                .unwrap();
        assert_eq!(matrix.column("Fee").unwrap().to_vec(), vec![2.0, 4.0]);
        assert!(matrix.column("Health").is_none());
    }
}
