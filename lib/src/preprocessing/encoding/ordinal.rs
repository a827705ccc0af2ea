//! Ordinal encoding for categorical columns with a declared order.
//!
//! Maps each category to its 0-based rank in an order supplied by
//! configuration. The order is domain knowledge and is never inferred from
//! data, so fitting only checks that the data respects it.

use crate::dataset::{Table, Value};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{ensure_rows, Encoder, FittedEncoder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordinal encoder for a single column.
///
/// # Example
/// ```ignore
/// use adoptml::preprocessing::{Encoder, OrdinalEncoder};
///
/// let encoder = OrdinalEncoder::new(
///     "Health",
///     vec!["Healthy".into(), "Minor Injury".into(), "Serious Injury".into()],
/// );
/// // Health: ["Minor Injury", "Healthy"] -> [1, 0]
/// let (encoded, fitted) = encoder.fit_transform(table)?;
/// ```
#[derive(Clone, Debug)]
pub struct OrdinalEncoder {
    column: String,
    order: Vec<String>,
}

impl OrdinalEncoder {
    pub fn new(column: impl Into<String>, order: Vec<String>) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }
}

/// Serializable parameters for a fitted OrdinalEncoder.
#[derive(Clone, Serialize, Deserialize)]
pub struct OrdinalEncoderParams {
    pub column: String,
    /// Declared order, lowest rank first.
    pub order: Vec<String>,
}

/// Fitted OrdinalEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "OrdinalEncoderParams", into = "OrdinalEncoderParams")]
pub struct FittedOrdinalEncoder {
    column: String,
    order: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl From<OrdinalEncoderParams> for FittedOrdinalEncoder {
    fn from(params: OrdinalEncoderParams) -> Self {
        Self::from_order(params.column, params.order)
    }
}

impl From<FittedOrdinalEncoder> for OrdinalEncoderParams {
    fn from(fitted: FittedOrdinalEncoder) -> Self {
        Self {
            column: fitted.column,
            order: fitted.order,
        }
    }
}

impl FittedOrdinalEncoder {
    fn from_order(column: String, order: Vec<String>) -> Self {
        let ranks = order
            .iter()
            .enumerate()
            .map(|(rank, category)| (category.clone(), rank))
            .collect();
        Self {
            column,
            order,
            ranks,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Rank of a category in the declared order.
    pub fn rank(&self, category: &str) -> Result<usize, PreprocessingError> {
        self.ranks.get(category).copied().ok_or_else(|| PreprocessingError::InvalidCategory {
            column: self.column.clone(),
            category: category.to_string(),
        })
    }
}

impl Encoder for OrdinalEncoder {
    type Fitted = FittedOrdinalEncoder;

    fn column(&self) -> &str {
        &self.column
    }

    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError> {
        ensure_rows(table, "OrdinalEncoder")?;
        if self.order.is_empty() {
            return Err(PreprocessingError::PolicyValidation(format!(
                "ordinal column `{}` has an empty order",
                self.column
            )));
        }

        let fitted = FittedOrdinalEncoder::from_order(self.column.clone(), self.order.clone());
        for value in table.require(&self.column)?.values() {
            fitted.rank(&value.category())?;
        }
        Ok(fitted)
    }
}

impl FittedEncoder for FittedOrdinalEncoder {
    fn column(&self) -> &str {
        &self.column
    }

    fn transform(&self, mut table: Table) -> Result<Table, PreprocessingError> {
        let encoded = table
            .require(&self.column)?
            .values()
            .iter()
            .map(|v| self.rank(&v.category()).map(|rank| Value::Int(rank as i64)))
            .collect::<Result<Vec<_>, _>>()?;
        table.replace_values(&self.column, encoded)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_order() -> Vec<String> {
        vec![
            "Healthy".to_string(),
            "Minor Injury".to_string(),
            "Serious Injury".to_string(),
        ]
    }

    fn health(values: &[&str]) -> Table {
        Table::from_rows(
            vec!["Health".into()],
            values.iter().map(|v| vec![Value::from(*v)]).collect(),
        )
        .unwrap()
    }

    fn ranks(table: &Table) -> Vec<f64> {
        table
            .column("Health")
            .unwrap()
            .values()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    }

    #[test]
    fn test_ordinal_declared_ranks() {
        let (encoded, _) = OrdinalEncoder::new("Health", health_order())
            .fit_transform(health(&["Serious Injury", "Healthy", "Minor Injury"]))
            .unwrap();
        assert_eq!(ranks(&encoded), vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ordinal_rank_not_inferred_from_data() {
        // Only the highest rank present: still encoded as 2, not 0.
        let (encoded, _) = OrdinalEncoder::new("Health", health_order())
            .fit_transform(health(&["Serious Injury"]))
            .unwrap();
        assert_eq!(ranks(&encoded), vec![2.0]);
    }

    #[test]
    fn test_ordinal_fit_rejects_undeclared() {
        let result = OrdinalEncoder::new("Health", health_order()).fit(&health(&["Critical"]));
        assert!(matches!(
            result,
            Err(PreprocessingError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_ordinal_transform_rejects_undeclared() {
        let fitted = OrdinalEncoder::new("Health", health_order())
            .fit(&health(&["Healthy"]))
            .unwrap();
        let result = fitted.transform(health(&["Healthy", "Critical"]));
        assert!(matches!(
            result,
            Err(PreprocessingError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_ordinal_declared_but_unseen_at_fit() {
        let fitted = OrdinalEncoder::new("Health", health_order())
            .fit(&health(&["Healthy"]))
            .unwrap();
        assert_eq!(fitted.rank("Minor Injury").unwrap(), 1);
    }

    #[test]
    fn test_ordinal_serialization_restores_ranks() {
        let fitted = OrdinalEncoder::new("Health", health_order())
            .fit(&health(&["Healthy"]))
            .unwrap();
        let bytes = bincode::serialize(&fitted).unwrap();
        let loaded: FittedOrdinalEncoder = bincode::deserialize(&bytes).unwrap();

        assert_eq!(loaded, fitted);
        assert_eq!(loaded.rank("Serious Injury").unwrap(), 2);
        assert!(loaded.rank("Critical").is_err());
    }
}
