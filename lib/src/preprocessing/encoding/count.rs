//! Count encoding for high-cardinality categorical columns.
//!
//! Maps each category to the number of times it occurred in the training
//! data. The counts are learned once and replayed verbatim: an inference batch
//! never contributes its own counts.

use crate::dataset::{Table, Value};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{ensure_rows, Encoder, FittedEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count encoder for a single column.
#[derive(Clone, Debug)]
pub struct CountEncoder {
    column: String,
    unseen_default: Option<f64>,
}

impl CountEncoder {
    /// Unseen categories map to `0.0` by default.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            unseen_default: Some(0.0),
        }
    }

    /// Value for categories unseen during fit; `None` makes them an error.
    pub fn with_unseen_default(mut self, default: Option<f64>) -> Self {
        self.unseen_default = default;
        self
    }
}

/// Fitted CountEncoder: training-set occurrence counts per category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedCountEncoder {
    column: String,
    counts: BTreeMap<String, f64>,
    unseen_default: Option<f64>,
}

impl FittedCountEncoder {
    pub fn counts(&self) -> &BTreeMap<String, f64> {
        &self.counts
    }

    /// Training count of a category, or the unseen default.
    pub fn count(&self, category: &str) -> Result<f64, PreprocessingError> {
        match (self.counts.get(category), self.unseen_default) {
            (Some(&count), _) => Ok(count),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(PreprocessingError::UnknownCategory {
                column: self.column.clone(),
                category: category.to_string(),
            }),
        }
    }
}

impl Encoder for CountEncoder {
    type Fitted = FittedCountEncoder;

    fn column(&self) -> &str {
        &self.column
    }

    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError> {
        ensure_rows(table, "CountEncoder")?;

        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for value in table.require(&self.column)?.values() {
            *counts.entry(value.category().into_owned()).or_insert(0.0) += 1.0;
        }

        Ok(FittedCountEncoder {
            column: self.column.clone(),
            counts,
            unseen_default: self.unseen_default,
        })
    }
}

impl FittedEncoder for FittedCountEncoder {
    fn column(&self) -> &str {
        &self.column
    }

    fn transform(&self, mut table: Table) -> Result<Table, PreprocessingError> {
        let encoded = table
            .require(&self.column)?
            .values()
            .iter()
            .map(|v| self.count(&v.category()).map(Value::Float))
            .collect::<Result<Vec<_>, _>>()?;
        table.replace_values(&self.column, encoded)?;
        Ok(table)
    }
}
