//! Core traits for encoder stages.
//!
//! This module defines the two central traits:
//! - [`Encoder`]: the unfitted stage; holds its column and configuration and can learn from data.
//! - [`FittedEncoder`]: the learned state of a stage; replays the encoding and can be serialized.
//!
//! Stages move a [`Table`] in and return the rewritten table, so a stage is a
//! pure function of `(table, configuration, learned state)`.

use crate::dataset::Table;
use crate::preprocessing::error::PreprocessingError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for unfitted encoder stages.
///
/// # Example
/// ```ignore
/// use adoptml::preprocessing::{Encoder, FittedEncoder, LabelEncoder};
///
/// let encoder = LabelEncoder::new("Color1");
/// let fitted = encoder.fit(&training_table)?;
/// let encoded = fitted.transform(inference_table)?;
/// ```
pub trait Encoder {
    /// The learned state produced by [`Encoder::fit`].
    type Fitted: FittedEncoder;

    /// Name of the column this stage encodes.
    fn column(&self) -> &str;

    /// Learn the encoding from training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if:
    /// - The column is missing from the table
    /// - The table has no rows
    /// - A value is invalid for this encoding
    fn fit(&self, table: &Table) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit on the table and encode it in one step.
    fn fit_transform(&self, table: Table) -> Result<(Table, Self::Fitted), PreprocessingError> {
        let fitted = self.fit(&table)?;
        let encoded = fitted.transform(table)?;
        Ok((encoded, fitted))
    }
}

/// Trait for the learned state of an encoder stage.
///
/// Fitted encoders are immutable: `transform` replays the learned mapping and
/// never updates it, so one instance can serve any number of inference calls.
pub trait FittedEncoder: Clone + Send + Sync + Serialize + DeserializeOwned {
    /// Name of the column this stage encodes.
    fn column(&self) -> &str;

    /// Encode the stage's column using the learned state.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] when the column is missing or holds a
    /// category the learned state cannot place.
    fn transform(&self, table: Table) -> Result<Table, PreprocessingError>;
}

pub(crate) fn ensure_rows(table: &Table, stage: &str) -> Result<(), PreprocessingError> {
    if table.n_rows() == 0 {
        return Err(PreprocessingError::EmptyData(format!(
            "Cannot fit {} on empty data",
            stage
        )));
    }
    Ok(())
}
