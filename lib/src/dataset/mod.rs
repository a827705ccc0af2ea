//! Tabular records and the sources that produce them.
//!
//! A [`Table`] is an ordered set of equally long [`Column`]s. Cells are
//! [`Value`]s: text, integer or float. Encoders consume and produce tables;
//! only the final stage of the pipeline turns a table into a numeric matrix.
//!
//! # Example
//!
//! ```rust
//! use adoptml::dataset::{Table, Value};
//!
//! let table = Table::from_rows(
//!     vec!["Type".to_string(), "Age".to_string()],
//!     vec![
//!         vec![Value::from("Dog"), Value::Int(2)],
//!         vec![Value::from("Cat"), Value::Int(7)],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(table.n_rows(), 2);
//! assert_eq!(table.column_names(), vec!["Type", "Age"]);
//! ```

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

pub mod csv_source;
pub mod memory;

pub use self::csv_source::{read_csv, CsvFileSource};
pub use self::memory::InMemorySource;

/// Abstract source of a tabular dataset.
///
/// A source either returns a complete, well-formed table or fails with
/// [`PreprocessingError::DataFetch`]. There are no partial reads and no
/// retries; callers see the failure immediately.
pub trait DataSource {
    /// Fetch the whole dataset.
    fn fetch(&self) -> Result<Table, PreprocessingError>;
}

/// A single cell of a tabular record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Parse a raw text cell, preferring integer, then float, then text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            Value::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// The category label of this cell, as used by every categorical encoder.
    pub fn category(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
        }
    }

    /// Numeric view of the cell; text cells have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    /// Convert a JSON scalar into a cell.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PreprocessingError> {
        match value {
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n.as_f64().map(Value::Float).ok_or_else(|| {
                    PreprocessingError::InvalidParameter(format!("unrepresentable number {}", n))
                }),
            },
            other => Err(PreprocessingError::InvalidParameter(format!(
                "expected a string or number, got {}",
                other
            ))),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category())
    }
}

/// A named column of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a numeric column.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Value::Float).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of equally long columns with unique names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, PreprocessingError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "duplicate column `{}`",
                    column.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "column `{}` has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a header and row-major cells.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, PreprocessingError> {
        let mut buffers: Vec<Vec<Value>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "row {} has {} cells, expected {}",
                    row_idx,
                    row.len(),
                    names.len()
                )));
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }
        Self::new(
            names
                .into_iter()
                .zip(buffers)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    /// Build a table from flat JSON objects.
    ///
    /// The first record fixes the column order; every record must carry
    /// exactly the same set of keys.
    pub fn from_json_records(
        records: &[serde_json::Map<String, serde_json::Value>],
    ) -> Result<Self, PreprocessingError> {
        let Some(first) = records.first() else {
            return Err(PreprocessingError::EmptyData(
                "no records to build a table from".to_string(),
            ));
        };
        let names: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if record.len() != names.len() || names.iter().any(|n| !record.contains_key(n)) {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "record {} does not share the column set of the first record",
                    idx
                )));
            }
            let row = names
                .iter()
                .map(|name| {
                    Value::from_json(&record[name]).map_err(|e| match e {
                        PreprocessingError::InvalidParameter(msg) => {
                            PreprocessingError::InvalidParameter(format!("column `{}`: {}", name, msg))
                        }
                        other => other,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Self::from_rows(names, rows)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up a column or fail with [`PreprocessingError::MissingColumn`].
    pub fn require(&self, name: &str) -> Result<&Column, PreprocessingError> {
        self.column(name)
            .ok_or_else(|| PreprocessingError::MissingColumn(name.to_string()))
    }

    /// Remove a column, returning it and its former position.
    pub fn take_column(&mut self, name: &str) -> Result<(usize, Column), PreprocessingError> {
        let idx = self
            .position(name)
            .ok_or_else(|| PreprocessingError::MissingColumn(name.to_string()))?;
        Ok((idx, self.columns.remove(idx)))
    }

    /// Insert columns starting at `index`, keeping their relative order.
    ///
    /// Fails if a name is already present or a length disagrees with the table.
    pub fn insert_columns(
        &mut self,
        index: usize,
        columns: Vec<Column>,
    ) -> Result<(), PreprocessingError> {
        let expected = if self.columns.is_empty() {
            columns.first().map_or(0, Column::len)
        } else {
            self.n_rows()
        };
        for column in &columns {
            if self.contains(&column.name) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "column `{}` already exists",
                    column.name
                )));
            }
            if column.len() != expected {
                return Err(PreprocessingError::InvalidParameter(format!(
                    "column `{}` has {} rows, expected {}",
                    column.name,
                    column.len(),
                    expected
                )));
            }
        }
        let index = index.min(self.columns.len());
        self.columns.splice(index..index, columns);
        Ok(())
    }

    /// Replace the cells of an existing column in place.
    pub fn replace_values(&mut self, name: &str, values: Vec<Value>) -> Result<(), PreprocessingError> {
        let n_rows = self.n_rows();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| PreprocessingError::MissingColumn(name.to_string()))?;
        if values.len() != n_rows {
            return Err(PreprocessingError::InvalidParameter(format!(
                "replacement for `{}` has {} rows, expected {}",
                name,
                values.len(),
                n_rows
            )));
        }
        column.values = values;
        Ok(())
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Type".into(), "Age".into(), "Fee".into()],
            vec![
                vec!["Dog".into(), Value::Int(2), Value::Float(10.5)],
                vec!["Cat".into(), Value::Int(5), Value::Float(0.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_value_parse_prefers_integer() {
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("4.5"), Value::Float(4.5));
        assert_eq!(Value::parse("Golden Retriever"), Value::from("Golden Retriever"));
    }

    #[test]
    fn test_value_category_for_numbers() {
        assert_eq!(Value::Int(3).category(), "3");
        assert_eq!(Value::Float(2.0).category(), "2");
        assert_eq!(Value::from("Dog").category(), "Dog");
    }

    #[test]
    fn test_value_from_json_rejects_bool() {
        assert!(Value::from_json(&json!(true)).is_err());
        assert_eq!(Value::from_json(&json!(200)).unwrap(), Value::Int(200));
        assert_eq!(Value::from_json(&json!(1.5)).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("a", vec![Value::Int(2)]),
        ]);
        assert!(matches!(result, Err(PreprocessingError::InvalidParameter(_))));
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let result = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_take_and_insert_keep_order() {
        let mut table = sample();
        let (idx, column) = table.take_column("Type").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(column.len(), 2);

        table
            .insert_columns(
                idx,
                vec![
                    Column::numeric("Type_Cat", [0.0, 1.0]),
                    Column::numeric("Type_Dog", [1.0, 0.0]),
                ],
            )
            .unwrap();
        assert_eq!(table.column_names(), vec!["Type_Cat", "Type_Dog", "Age", "Fee"]);
    }

    #[test]
    fn test_insert_rejects_existing_name() {
        let mut table = sample();
        let result = table.insert_columns(0, vec![Column::numeric("Age", [1.0, 2.0])]);
        assert!(matches!(result, Err(PreprocessingError::PolicyValidation(_))));
    }

    #[test]
    fn test_require_missing_column() {
        let table = sample();
        assert!(matches!(
            table.require("Breed1"),
            Err(PreprocessingError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_from_json_records_keeps_key_order() {
        let records = vec![
            json!({"Type": "Dog", "Age": 2}).as_object().unwrap().clone(),
            json!({"Age": 4, "Type": "Cat"}).as_object().unwrap().clone(),
        ];
        let table = Table::from_json_records(&records).unwrap();
        assert_eq!(table.column_names(), vec!["Type", "Age"]);
        assert_eq!(table.column("Age").unwrap().values()[1], Value::Int(4));
    }

    #[test]
    fn test_from_json_records_rejects_mismatched_keys() {
        let records = vec![
            json!({"Type": "Dog", "Age": 2}).as_object().unwrap().clone(),
            json!({"Type": "Cat"}).as_object().unwrap().clone(),
        ];
        assert!(Table::from_json_records(&records).is_err());
    }
}
