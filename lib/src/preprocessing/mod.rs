//! Categorical feature encoding for tabular records.
//!
//! A [`ColumnPolicy`] assigns each column an encoding family. The
//! [`Pipeline`] runs the matching encoder stages in a fixed order and returns
//! a numeric [`EncodedMatrix`] together with the [`LearnedState`] and the
//! frozen [`FeatureSchema`]. At inference the same state is replayed and the
//! [`FeatureAligner`] reconciles the output with the schema.
//!
//! # Core Traits
//!
//! - [`Encoder`]: unfitted stage for one column
//! - [`FittedEncoder`]: learned state of a stage, replayable and serializable
//!
//! # Stages
//!
//! - [`OneHotEncoder`]: one 0/1 column per category
//! - [`LabelEncoder`]: sorted dense codes
//! - [`OrdinalEncoder`]: declared rank order
//! - [`CountEncoder`]: training-set frequency
//! - [`BinaryTargetEncoder`]: two-valued target to `{1, 0}`
//!
//! # Example
//!
//! ```ignore
//! use adoptml::preprocessing::{ColumnPolicy, FeatureAligner, Pipeline};
//!
//! let pipeline = Pipeline::new(ColumnPolicy::pet_adoption())?;
//! let fit = pipeline.fit_transform(training_table)?;
//!
//! // Later, for one record:
//! let encoded = pipeline.transform_for_inference(record, &fit.state)?;
//! let (features, report) = FeatureAligner::new(&fit.schema)?.align(&encoded)?;
//! ```

pub mod aligner;
pub mod encoding;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod traits;

// Re-export main types
pub use aligner::{AlignmentReport, FeatureAligner};
pub use encoding::{
    dummy_column_name, BinaryTargetEncoder, CountEncoder, FittedBinaryTargetEncoder,
    FittedCountEncoder, FittedLabelEncoder, FittedOneHotEncoder, FittedOrdinalEncoder,
    LabelEncoder, OneHotEncoder, OrdinalEncoder, OrdinalEncoderParams,
};
pub use error::PreprocessingError;
pub use pipeline::{EncodedMatrix, FeatureSchema, FitOutput, LearnedState, Pipeline};
pub use policy::{ColumnPolicy, EncodingKind, TargetLabels, UnknownLabel};
pub use traits::{Encoder, FittedEncoder};
