//! Error types for preprocessing operations.

use thiserror::Error;

/// Error type for loading, encoding, aligning and scoring tabular records.
///
/// Every stage raises its own variant at its boundary; the pipeline and the
/// orchestrators pass them through untouched.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// The data source was unreachable or returned a malformed table.
    #[error("Data fetch error: {0}")]
    DataFetch(String),
    /// A column is unassigned, doubly assigned, or references a column that does not exist.
    #[error("Policy validation error: {0}")]
    PolicyValidation(String),
    /// A category was not seen during fit and the column has no configured default.
    #[error("Unknown category `{category}` in column `{column}`")]
    UnknownCategory { column: String, category: String },
    /// A category lies outside the declared order (ordinal) or the binary labels (target).
    #[error("Invalid category `{category}` in column `{column}`")]
    InvalidCategory { column: String, category: String },
    /// The feature schema is missing or does not match the model.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A column required by the policy is absent from the input table.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Invalid parameter or malformed input value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for PreprocessingError {
    fn from(err: csv::Error) -> Self {
        PreprocessingError::DataFetch(err.to_string())
    }
}

impl From<serde_json::Error> for PreprocessingError {
    fn from(err: serde_json::Error) -> Self {
        PreprocessingError::Serialization(err.to_string())
    }
}
