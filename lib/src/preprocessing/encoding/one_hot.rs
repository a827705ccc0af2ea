//! One-hot encoding for categorical columns.
//!
//! Replaces a categorical column, in place, with one 0/1 column per distinct
//! category, named by [`dummy_column_name`].

use crate::dataset::{Column, Table};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{ensure_rows, Encoder, FittedEncoder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Name of the dummy column for `category` of `column`: `{column}_{category}`.
pub fn dummy_column_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

/// One-hot encoder for a single categorical column.
///
/// # Example
/// ```ignore
/// use adoptml::preprocessing::{Encoder, OneHotEncoder};
///
/// // Type: ["Dog", "Cat", "Dog"]
/// let encoder = OneHotEncoder::new("Type");
/// let (encoded, fitted) = encoder.fit_transform(table)?;
///
/// // Type_Cat: [0, 1, 0]
/// // Type_Dog: [1, 0, 1]
/// assert_eq!(fitted.realized_columns(), vec!["Type_Cat", "Type_Dog"]);
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    column: String,
}

impl OneHotEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

/// Fitted OneHotEncoder: the categories seen during fit, sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    column: String,
    categories: Vec<String>,
}

impl FittedOneHotEncoder {
    /// Get the categories learned during fit, sorted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Dummy columns realized at fit time, in output order.
    pub fn realized_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| dummy_column_name(&self.column, c))
            .collect()
    }
}

fn sorted_categories(column: &Column) -> Vec<String> {
    column
        .values()
        .iter()
        .map(|v| v.category().into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl Encoder for OneHotEncoder {
    type Fitted = FittedOneHotEncoder;

    fn column(&self) -> &str {
        &self.column
    }

    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError> {
        ensure_rows(table, "OneHotEncoder")?;
        let column = table.require(&self.column)?;

        Ok(FittedOneHotEncoder {
            column: self.column.clone(),
            categories: sorted_categories(column),
        })
    }
}

impl FittedEncoder for FittedOneHotEncoder {
    fn column(&self) -> &str {
        &self.column
    }

    /// Emits one dummy per category present in `table`.
    ///
    /// Categories present in the batch but not learned at fit still get a
    /// dummy column; those are removed later by the feature aligner.
    fn transform(&self, mut table: Table) -> Result<Table, PreprocessingError> {
        let (position, column) = table.take_column(&self.column)?;
        let observed = sorted_categories(&column);

        let learned: HashSet<&str> = self.categories.iter().map(String::as_str).collect();
        let unseen: Vec<&str> = observed
            .iter()
            .map(String::as_str)
            .filter(|c| !learned.contains(c))
            .collect();
        if !unseen.is_empty() {
            tracing::warn!(
                column = %self.column,
                categories = ?unseen,
                "one-hot categories not seen during fit; their dummies will be dropped at alignment"
            );
        }

        let mut names = HashSet::with_capacity(observed.len());
        let mut dummies = Vec::with_capacity(observed.len());
        for category in &observed {
            let name = dummy_column_name(&self.column, category);
            if !names.insert(name.clone()) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "one-hot dummy `{}` is produced twice",
                    name
                )));
            }
            let values = column
                .values()
                .iter()
                .map(|v| if v.category() == category.as_str() { 1.0 } else { 0.0 });
            dummies.push(Column::numeric(name, values));
        }

        table.insert_columns(position, dummies).map_err(|e| match e {
            PreprocessingError::PolicyValidation(msg) => PreprocessingError::PolicyValidation(
                format!("one-hot encoding of `{}` collides: {}", self.column, msg),
            ),
            other => other,
        })?;
        Ok(table)
    }
}
