//! Settings persistence layer
//!
//! Loads and saves [`PickerSettings`] as pretty JSON. Safe loading never
//! fails: corrupt or unsupported data yields the defaults.

use crate::PickerSettings;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    #[error("Settings I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Serializes settings to JSON bytes
pub fn serialize_settings(settings: &PickerSettings) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(settings)
        .map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes settings from JSON bytes
pub fn deserialize_settings(bytes: &[u8]) -> PersistenceResult<PickerSettings> {
    let settings: PickerSettings = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    if settings.version != PickerSettings::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(settings.version));
    }

    Ok(settings)
}

/// Attempts to load settings from bytes, falling back to defaults on error
pub fn load_settings_safe(bytes: &[u8]) -> PickerSettings {
    deserialize_settings(bytes).unwrap_or_default()
}

/// Reads settings from a JSON file
pub fn load_settings_file(path: &Path) -> PersistenceResult<PickerSettings> {
    let bytes = fs::read(path)?;
    deserialize_settings(&bytes)
}

/// Writes settings to a JSON file
pub fn save_settings_file(path: &Path, settings: &PickerSettings) -> PersistenceResult<()> {
    let bytes = serialize_settings(settings)?;
    fs::write(path, bytes)?;
    Ok(())
}
