//! Preprocessing pipeline: runs the encoder stages a [`ColumnPolicy`] selects.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Pipeline`] | Fixed-order stage runner with fit and replay modes |
//! | [`LearnedState`] | Fitted state of every stage |
//! | [`FeatureSchema`] | Frozen, ordered feature column names |
//! | [`EncodedMatrix`] | Numeric output with column names |
//!
//! [`ColumnPolicy`]: crate::preprocessing::ColumnPolicy

#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod state;

pub use pipeline::{FitOutput, Pipeline};
pub use state::{EncodedMatrix, FeatureSchema, LearnedState};
