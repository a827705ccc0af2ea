//! Binary encoding of the target column.

use crate::dataset::{Table, Value};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::policy::TargetLabels;
use crate::preprocessing::traits::{ensure_rows, Encoder, FittedEncoder};
use serde::{Deserialize, Serialize};

/// Maps a two-valued target column to `1` (positive) and `0` (negative).
///
/// Any value other than the two configured labels is an
/// [`PreprocessingError::InvalidCategory`].
#[derive(Clone, Debug)]
pub struct BinaryTargetEncoder {
    column: String,
    labels: TargetLabels,
}

impl BinaryTargetEncoder {
    pub fn new(column: impl Into<String>, labels: TargetLabels) -> Self {
        Self {
            column: column.into(),
            labels,
        }
    }
}

/// Fitted BinaryTargetEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedBinaryTargetEncoder {
    column: String,
    labels: TargetLabels,
    /// Share of positive rows seen during fit.
    positive_rate: f64,
}

impl FittedBinaryTargetEncoder {
    pub fn labels(&self) -> &TargetLabels {
        &self.labels
    }

    pub fn positive_rate(&self) -> f64 {
        self.positive_rate
    }

    pub fn encode(&self, category: &str) -> Result<f64, PreprocessingError> {
        if category == self.labels.positive {
            Ok(1.0)
        } else if category == self.labels.negative {
            Ok(0.0)
        } else {
            Err(PreprocessingError::InvalidCategory {
                column: self.column.clone(),
                category: category.to_string(),
            })
        }
    }
}

impl Encoder for BinaryTargetEncoder {
    type Fitted = FittedBinaryTargetEncoder;

    fn column(&self) -> &str {
        &self.column
    }

    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError> {
        ensure_rows(table, "BinaryTargetEncoder")?;
        let mut fitted = FittedBinaryTargetEncoder {
            column: self.column.clone(),
            labels: self.labels.clone(),
            positive_rate: 0.0,
        };

        let column = table.require(&self.column)?;
        let mut positives = 0.0;
        for value in column.values() {
            positives += fitted.encode(&value.category())?;
        }
        fitted.positive_rate = positives / column.len() as f64;
        Ok(fitted)
    }
}

impl FittedEncoder for FittedBinaryTargetEncoder {
    fn column(&self) -> &str {
        &self.column
    }

    fn transform(&self, mut table: Table) -> Result<Table, PreprocessingError> {
        let encoded = table
            .require(&self.column)?
            .values()
            .iter()
            .map(|v| self.encode(&v.category()).map(Value::Float))
            .collect::<Result<Vec<_>, _>>()?;
        table.replace_values(&self.column, encoded)?;
        Ok(table)
    }
}
