//! Categorical encoder stages.
//!
//! Each stage encodes one column of a [`Table`](crate::dataset::Table) and
//! learns the state it needs to replay the same encoding at inference.
//!
//! # Available Encoders
//!
//! ## OneHotEncoder
//! Replaces a column with one 0/1 dummy per category.
//!
//! ```ignore
//! // Type: ["Dog", "Cat"]
//! // Type_Cat: [0, 1], Type_Dog: [1, 0]
//! ```
//!
//! ## LabelEncoder
//! Dense codes `0..k-1` in sorted category order.
//!
//! ## OrdinalEncoder
//! Ranks in an explicitly declared order.
//!
//! ## CountEncoder
//! Training-set occurrence counts.
//!
//! ## BinaryTargetEncoder
//! Two-valued target column to `{1, 0}`.

mod count;
mod label;
mod one_hot;
mod ordinal;
mod target;

pub use count::{CountEncoder, FittedCountEncoder};
pub use label::{FittedLabelEncoder, LabelEncoder};
pub use one_hot::{dummy_column_name, FittedOneHotEncoder, OneHotEncoder};
pub use ordinal::{FittedOrdinalEncoder, OrdinalEncoder, OrdinalEncoderParams};
pub use target::{BinaryTargetEncoder, FittedBinaryTargetEncoder};
