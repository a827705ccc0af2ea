//! Label encoding for categorical feature columns.
//!
//! Maps categories to dense integer codes `0..k-1`, assigned in sorted
//! lexicographic order of the category labels seen during fit.

use crate::dataset::{Table, Value};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::policy::UnknownLabel;
use crate::preprocessing::traits::{ensure_rows, Encoder, FittedEncoder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label encoder for a single categorical column.
///
/// # Example
/// ```ignore
/// use adoptml::preprocessing::{Encoder, FittedEncoder, LabelEncoder};
///
/// // Color1: ["White", "Brown", "Black", "Brown"]
/// let fitted = LabelEncoder::new("Color1").fit(&table)?;
///
/// // Sorted: Black -> 0, Brown -> 1, White -> 2
/// let encoded = fitted.transform(table)?;
/// // Color1: [2, 1, 0, 1]
/// ```
#[derive(Clone, Debug)]
pub struct LabelEncoder {
    column: String,
    handle_unknown: UnknownLabel,
}

impl LabelEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            handle_unknown: UnknownLabel::default(),
        }
    }

    /// Set the strategy for categories unseen during fit.
    pub fn with_handle_unknown(mut self, strategy: UnknownLabel) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Fitted LabelEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLabelEncoder {
    column: String,
    /// Category to code, codes dense from zero in key order.
    codes: BTreeMap<String, usize>,
    handle_unknown: UnknownLabel,
}

impl FittedLabelEncoder {
    /// Get the learned classes, in code order.
    pub fn classes(&self) -> Vec<&str> {
        self.codes.keys().map(String::as_str).collect()
    }

    pub fn n_classes(&self) -> usize {
        self.codes.len()
    }

    /// Code of a category, applying the unknown-category strategy.
    pub fn code(&self, category: &str) -> Result<usize, PreprocessingError> {
        match self.codes.get(category) {
            Some(&code) => Ok(code),
            None => match self.handle_unknown {
                UnknownLabel::Reserve => Ok(self.codes.len()),
                UnknownLabel::Error => Err(PreprocessingError::UnknownCategory {
                    column: self.column.clone(),
                    category: category.to_string(),
                }),
            },
        }
    }

    /// Inverse of [`FittedLabelEncoder::code`] for learned codes.
    pub fn class_of(&self, code: usize) -> Option<&str> {
        self.codes.keys().nth(code).map(String::as_str)
    }
}

impl Encoder for LabelEncoder {
    type Fitted = FittedLabelEncoder;

    fn column(&self) -> &str {
        &self.column
    }

    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError> {
        ensure_rows(table, "LabelEncoder")?;
        let column = table.require(&self.column)?;

        let classes: BTreeSet<String> = column
            .values()
            .iter()
            .map(|v| v.category().into_owned())
            .collect();
        let codes = classes
            .into_iter()
            .enumerate()
            .map(|(code, class)| (class, code))
            .collect();

        Ok(FittedLabelEncoder {
            column: self.column.clone(),
            codes,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedEncoder for FittedLabelEncoder {
    fn column(&self) -> &str {
        &self.column
    }

    fn transform(&self, mut table: Table) -> Result<Table, PreprocessingError> {
        let encoded = table
            .require(&self.column)?
            .values()
            .iter()
            .map(|v| self.code(&v.category()).map(|code| Value::Int(code as i64)))
            .collect::<Result<Vec<_>, _>>()?;
        table.replace_values(&self.column, encoded)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(values: &[&str]) -> Table {
        Table::from_rows(
            vec!["Color1".into()],
            values.iter().map(|v| vec![Value::from(*v)]).collect(),
        )
        .unwrap()
    }

    fn codes(table: &Table) -> Vec<i64> {
        table
            .column("Color1")
            .unwrap()
            .values()
            .iter()
            .map(|v| match v {
                Value::Int(i) => *i,
                other => panic!("expected integer code, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_label_encoder_sorted_codes() {
        let (encoded, fitted) = LabelEncoder::new("Color1")
            .fit_transform(colors(&["White", "Brown", "Black", "Brown"]))
            .unwrap();

        assert_eq!(fitted.classes(), vec!["Black", "Brown", "White"]);
        assert_eq!(codes(&encoded), vec![2, 1, 0, 1]);
    }

    #[test]
    fn test_label_encoder_order_independent_of_input_order() {
        let a = LabelEncoder::new("Color1")
            .fit(&colors(&["Brown", "White", "Black"]))
            .unwrap();
        let b = LabelEncoder::new("Color1")
            .fit(&colors(&["Black", "Black", "White", "Brown"]))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_label_encoder_unknown_error() {
        let fitted = LabelEncoder::new("Color1")
            .fit(&colors(&["Black", "White"]))
            .unwrap();
        let result = fitted.transform(colors(&["Golden"]));
        match result {
            Err(PreprocessingError::UnknownCategory { column, category }) => {
                assert_eq!(column, "Color1");
                assert_eq!(category, "Golden");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_label_encoder_unknown_reserved_code() {
        let fitted = LabelEncoder::new("Color1")
            .with_handle_unknown(UnknownLabel::Reserve)
            .fit(&colors(&["Black", "White"]))
            .unwrap();
        let encoded = fitted.transform(colors(&["Golden", "White"])).unwrap();
        assert_eq!(codes(&encoded), vec![2, 1]);
    }

    #[test]
    fn test_label_encoder_class_of() {
        let fitted = LabelEncoder::new("Color1")
            .fit(&colors(&["Yes", "No"]))
            .unwrap();
        assert_eq!(fitted.class_of(0), Some("No"));
        assert_eq!(fitted.class_of(1), Some("Yes"));
        assert_eq!(fitted.class_of(2), None);
    }

    #[test]
    fn test_label_encoder_empty_data() {
        let result = LabelEncoder::new("Color1").fit(&colors(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_label_encoder_serialization() {
        let fitted = LabelEncoder::new("Color1")
            .fit(&colors(&["Black", "White"]))
            .unwrap();
        let bytes = bincode::serialize(&fitted).unwrap();
        let loaded: FittedLabelEncoder = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded.classes(), fitted.classes());
        assert_eq!(loaded.code("White").unwrap(), 1);
    }
}
