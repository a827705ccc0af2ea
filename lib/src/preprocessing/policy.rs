//! Column policy: which encoding family applies to which column.
//!
//! The policy is plain configuration, usually loaded from JSON:
//!
//! ```json
//! {
//!   "one_hot_columns": ["Type", "Gender"],
//!   "label_columns": ["Vaccinated", "Sterilized", "Color1", "Color2"],
//!   "ordinal_columns": {
//!     "Health": ["Healthy", "Minor Injury", "Serious Injury"]
//!   },
//!   "count_column": "Breed1",
//!   "target_column": "Adopted"
//! }
//! ```
//!
//! It is validated once, when loaded or when a pipeline is built from it.
//! Columns that appear in no list are passthrough features and must be numeric.

use crate::dataset::Table;
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The encoding family assigned to a column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodingKind {
    OneHot,
    Label,
    /// Ordinal encoding with its declared order, lowest rank first.
    Ordinal(Vec<String>),
    Count,
    BinaryTarget,
    Passthrough,
}

impl EncodingKind {
    pub fn name(&self) -> &'static str {
        match self {
            EncodingKind::OneHot => "one-hot",
            EncodingKind::Label => "label",
            EncodingKind::Ordinal(_) => "ordinal",
            EncodingKind::Count => "count",
            EncodingKind::BinaryTarget => "binary-target",
            EncodingKind::Passthrough => "passthrough",
        }
    }
}

/// What the label encoder does with a category it never saw during fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLabel {
    /// Fail with [`PreprocessingError::UnknownCategory`].
    #[default]
    Error,
    /// Map it to the reserved code `k`, one past the last learned code.
    Reserve,
}

/// The two raw values of the binary target column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLabels {
    pub positive: String,
    pub negative: String,
}

impl Default for TargetLabels {
    fn default() -> Self {
        Self {
            positive: "yes".to_string(),
            negative: "no".to_string(),
        }
    }
}

fn default_count_unseen() -> Option<f64> {
    Some(0.0)
}

/// Declarative per-column encoding configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnPolicy {
    #[serde(default)]
    pub one_hot_columns: Vec<String>,
    #[serde(default)]
    pub label_columns: Vec<String>,
    /// Column name to its declared category order.
    #[serde(default)]
    pub ordinal_columns: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub count_column: Option<String>,
    pub target_column: String,
    #[serde(default)]
    pub label_unknown: UnknownLabel,
    /// Value for count-encoded categories unseen during fit; `null` makes them an error.
    #[serde(default = "default_count_unseen")]
    pub count_unseen_default: Option<f64>,
    #[serde(default)]
    pub target_labels: TargetLabels,
}

impl ColumnPolicy {
    /// Empty policy: every feature column is passthrough.
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            one_hot_columns: Vec::new(),
            label_columns: Vec::new(),
            ordinal_columns: BTreeMap::new(),
            count_column: None,
            target_column: target_column.into(),
            label_unknown: UnknownLabel::default(),
            count_unseen_default: default_count_unseen(),
            target_labels: TargetLabels::default(),
        }
    }

    /// The policy for the pet adoption dataset.
    pub fn pet_adoption() -> Self {
        let order = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        Self::new("Adopted")
            .with_one_hot(["Type", "Gender"])
            .with_label(["Vaccinated", "Sterilized", "Color1", "Color2"])
            .with_ordinal("Health", order(&["Healthy", "Minor Injury", "Serious Injury"]))
            .with_ordinal("FurLength", order(&["Short", "Medium", "Long"]))
            .with_ordinal("MaturitySize", order(&["Small", "Medium", "Large"]))
            .with_count("Breed1")
    }

    pub fn with_one_hot<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_hot_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn with_label<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn with_ordinal(mut self, column: impl Into<String>, order: Vec<String>) -> Self {
        self.ordinal_columns.insert(column.into(), order);
        self
    }

    pub fn with_count(mut self, column: impl Into<String>) -> Self {
        self.count_column = Some(column.into());
        self
    }

    pub fn with_label_unknown(mut self, strategy: UnknownLabel) -> Self {
        self.label_unknown = strategy;
        self
    }

    pub fn with_count_unseen_default(mut self, default: Option<f64>) -> Self {
        self.count_unseen_default = default;
        self
    }

    pub fn with_target_labels(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.target_labels = TargetLabels {
            positive: positive.into(),
            negative: negative.into(),
        };
        self
    }

    /// Parse and validate a policy from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, PreprocessingError> {
        let policy: Self = serde_json::from_str(json)
            .map_err(|e| PreprocessingError::PolicyValidation(format!("malformed policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read, parse and validate a policy file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, PreprocessingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every explicitly assigned column with its kind, target last.
    pub fn assignments(&self) -> Vec<(&str, EncodingKind)> {
        let mut out: Vec<(&str, EncodingKind)> = Vec::new();
        out.extend(self.one_hot_columns.iter().map(|c| (c.as_str(), EncodingKind::OneHot)));
        out.extend(self.label_columns.iter().map(|c| (c.as_str(), EncodingKind::Label)));
        out.extend(
            self.ordinal_columns
                .iter()
                .map(|(c, order)| (c.as_str(), EncodingKind::Ordinal(order.clone()))),
        );
        if let Some(c) = &self.count_column {
            out.push((c.as_str(), EncodingKind::Count));
        }
        out.push((self.target_column.as_str(), EncodingKind::BinaryTarget));
        out
    }

    /// The kind of a column; unlisted columns are passthrough.
    pub fn kind_of(&self, column: &str) -> EncodingKind {
        self.assignments()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| kind)
            .unwrap_or(EncodingKind::Passthrough)
    }

    /// Check the policy on its own: names, single assignment, ordinal orders.
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        if self.target_column.trim().is_empty() {
            return Err(PreprocessingError::PolicyValidation(
                "target column must be named".to_string(),
            ));
        }

        let mut seen: HashMap<&str, &'static str> = HashMap::new();
        for (column, kind) in self.assignments() {
            if column.trim().is_empty() {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "empty column name under {}",
                    kind.name()
                )));
            }
            if let Some(previous) = seen.insert(column, kind.name()) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "column `{}` is assigned to both {} and {}",
                    column,
                    previous,
                    kind.name()
                )));
            }
        }

        for (column, order) in &self.ordinal_columns {
            if order.is_empty() {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "ordinal column `{}` has an empty order",
                    column
                )));
            }
            let mut distinct = std::collections::HashSet::new();
            if let Some(dup) = order.iter().find(|c| !distinct.insert(c.as_str())) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "ordinal column `{}` lists `{}` twice",
                    column, dup
                )));
            }
        }

        if self.target_labels.positive == self.target_labels.negative {
            return Err(PreprocessingError::PolicyValidation(
                "target labels must differ".to_string(),
            ));
        }

        if let Some(default) = self.count_unseen_default {
            if !default.is_finite() {
                return Err(PreprocessingError::PolicyValidation(
                    "count_unseen_default must be finite".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check that every feature column the policy names exists in `table`.
    ///
    /// The target column is only required when `require_target` is set
    /// (training); at inference it is absent by construction.
    pub fn check_columns(&self, table: &Table, require_target: bool) -> Result<(), PreprocessingError> {
        for (column, kind) in self.assignments() {
            if kind == EncodingKind::BinaryTarget && !require_target {
                continue;
            }
            if !table.contains(column) {
                return Err(PreprocessingError::PolicyValidation(format!(
                    "{} column `{}` does not exist in the dataset",
                    kind.name(),
                    column
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    #[test]
    fn test_pet_adoption_policy_is_valid() {
        let policy = ColumnPolicy::pet_adoption();
        policy.validate().unwrap();
        assert_eq!(policy.kind_of("Type"), EncodingKind::OneHot);
        assert_eq!(policy.kind_of("Breed1"), EncodingKind::Count);
        assert_eq!(policy.kind_of("Adopted"), EncodingKind::BinaryTarget);
        assert_eq!(policy.kind_of("Age"), EncodingKind::Passthrough);
        assert!(matches!(policy.kind_of("Health"), EncodingKind::Ordinal(_)));
    }

    #[test]
    fn test_from_json_str_parses_spec_keys() {
        let json = r#"{
            "one_hot_columns": ["Type", "Gender"],
            "label_columns": ["Vaccinated"],
            "ordinal_columns": {"Health": ["Healthy", "Minor Injury", "Serious Injury"]},
            "count_column": "Breed1",
            "target_column": "Adopted"
        }"#;
        let policy = ColumnPolicy::from_json_str(json).unwrap();
        assert_eq!(policy.one_hot_columns, vec!["Type", "Gender"]);
        assert_eq!(policy.count_unseen_default, Some(0.0));
        assert_eq!(policy.label_unknown, UnknownLabel::Error);
        assert_eq!(policy.target_labels.positive, "yes");
    }

    #[test]
    fn test_from_json_str_null_count_default() {
        let json = r#"{"target_column": "Adopted", "count_column": "Breed1", "count_unseen_default": null}"#;
        let policy = ColumnPolicy::from_json_str(json).unwrap();
        assert_eq!(policy.count_unseen_default, None);
    }

    #[test]
    fn test_from_json_str_rejects_unknown_keys() {
        let json = r#"{"target_column": "Adopted", "hash_columns": ["Type"]}"#;
        assert!(matches!(
            ColumnPolicy::from_json_str(json),
            Err(PreprocessingError::PolicyValidation(_))
        ));
    }

    #[test]
    fn test_doubly_assigned_column_fails() {
        let policy = ColumnPolicy::new("Adopted")
            .with_one_hot(["Type"])
            .with_label(["Type"]);
        let err = policy.validate().unwrap_err();
        assert!(matches!(err, PreprocessingError::PolicyValidation(_)));
        assert!(err.to_string().contains("`Type`"));
    }

    #[test]
    fn test_target_as_feature_fails() {
        let policy = ColumnPolicy::new("Adopted").with_label(["Adopted"]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_duplicate_ordinal_entry_fails() {
        let policy = ColumnPolicy::new("Adopted")
            .with_ordinal("Health", vec!["Healthy".into(), "Healthy".into()]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_empty_ordinal_order_fails() {
        let policy = ColumnPolicy::new("Adopted").with_ordinal("Health", Vec::new());
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_identical_target_labels_fail() {
        let policy = ColumnPolicy::new("Adopted").with_target_labels("yes", "yes");
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_check_columns_nonexistent() {
        let policy = ColumnPolicy::new("Adopted").with_one_hot(["Type"]);
        let table = Table::new(vec![Column::new("Age", vec![Value::Int(1)])]).unwrap();
        assert!(matches!(
            policy.check_columns(&table, false),
            Err(PreprocessingError::PolicyValidation(_))
        ));
    }

    #[test]
    fn test_check_columns_target_only_for_training() {
        let policy = ColumnPolicy::new("Adopted");
        let table = Table::new(vec![Column::new("Age", vec![Value::Int(1)])]).unwrap();
        assert!(policy.check_columns(&table, false).is_ok());
        assert!(policy.check_columns(&table, true).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let policy = ColumnPolicy::pet_adoption().with_label_unknown(UnknownLabel::Reserve);
        let json = policy.to_json_string().unwrap();
        let loaded = ColumnPolicy::from_json_str(&json).unwrap();
        assert_eq!(loaded, policy);
    }
}
