//! Binary persistence for fitted state and trained models.
//!
//! Everything that can be saved goes through [`SerializableParams`], a
//! blanket trait over serde types that encodes with `bincode`.

use crate::preprocessing::error::PreprocessingError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Bincode encoding for any serde type.
pub trait SerializableParams: Serialize + DeserializeOwned {
    fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl<T: Serialize + DeserializeOwned> SerializableParams for T {}

/// Encode `value` and write it to `path`.
pub fn save_to_file<T: SerializableParams, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> Result<(), PreprocessingError> {
    let bytes = value.to_bytes()?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read `path` and decode it.
pub fn load_from_file<T: SerializableParams, P: AsRef<Path>>(
    path: P,
) -> Result<T, PreprocessingError> {
    let bytes = std::fs::read(path)?;
    Ok(T::from_bytes(&bytes)?)
}
