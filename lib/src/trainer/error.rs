//! Error type for the training orchestrator.

use crate::preprocessing::error::PreprocessingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    /// Loading, encoding or persistence failed.
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    /// A training parameter is out of range.
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),
    /// A partition or class has too few rows to continue.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
