//! # adoptml
//!
//! Feature encoding, training and inference for shelter adoption prediction.
//!
//! Raw tabular records (categorical and numeric animal attributes) are turned
//! into a fixed-width numeric matrix by a declarative encoding pipeline. The
//! same transformation is replayed exactly at inference, and the result is
//! aligned to the feature schema the model was trained on.
//!
//! ## Core Design Principles
//!
//! - **Fit once, replay forever**: fitting returns an immutable
//!   [`LearnedState`](preprocessing::LearnedState); inference only replays it.
//! - **Frozen schema**: the training feature layout is stored with the model
//!   and every inference matrix is aligned to it.
//! - **One bundle**: model, schema, learned state and policy are persisted
//!   together as a [`ModelArtifact`](artifact::ModelArtifact).
//!
//! ## Quick Start
//!
//! ```ignore
//! use adoptml::dataset::CsvFileSource;
//! use adoptml::inference::{Predictor, PredictorConfig};
//! use adoptml::preprocessing::ColumnPolicy;
//! use adoptml::trainer::{Trainer, TrainingConfig};
//!
//! let trainer = Trainer::new(ColumnPolicy::pet_adoption(), TrainingConfig::default())?;
//! let outcome = trainer.run(&CsvFileSource::new("pets.csv"), "adoption.bin")?;
//! println!("{}", outcome.metrics);
//!
//! let predictor = Predictor::load("adoption.bin", PredictorConfig::default())?;
//! let label = predictor.predict_json(r#"{"Type": "Dog", "Age": 3, ...}"#)?;
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: tables, cell values and data sources (CSV, in-memory)
//! - `preprocessing`: column policy, encoder stages, pipeline, aligner
//! - `model`: scoring models (gradient-boosted trees)
//! - `trainer`: split, SMOTE, boosting, evaluation
//! - `artifact`: persisted model bundle
//! - `inference`: predictor and thresholding
//! - `serialization`: bincode persistence helpers

/// Tables, cell values and data sources.
pub mod dataset;

/// Column policy, encoder stages, pipeline and feature aligner.
pub mod preprocessing;

/// Scoring models.
pub mod model;

/// Training orchestration.
pub mod trainer;

/// Persisted model bundle.
pub mod artifact;

/// Inference orchestration.
pub mod inference;

/// Binary persistence helpers.
pub mod serialization;

pub use artifact::ModelArtifact;
pub use dataset::{DataSource, Table, Value};
pub use inference::{classify, Prediction, Predictor, PredictorConfig};
pub use preprocessing::{ColumnPolicy, PreprocessingError};
pub use trainer::{Trainer, TrainingConfig, TrainingError};
