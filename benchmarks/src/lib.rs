//! Benchmark fixtures for adoptml.
//!
//! Provides seeded synthetic shelter datasets so the pipeline and scoring
//! benchmarks run without any files on disk.

pub mod data;

pub use data::{shelter_records, shelter_table, ShelterGenerator};
