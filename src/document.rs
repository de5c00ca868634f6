//! Loading document files (templates, instances, data) from disk.

use crate::model::{ComponentInstance, DataSources, EngineError, TemplateConfig};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read and deserialize a JSON document.
///
/// # Errors
///
/// Returns `EngineError::Read` when the file cannot be read and
/// `EngineError::Document` when it is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, EngineError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| EngineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&contents).map_err(|source| EngineError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "Loaded document");
    Ok(value)
}

/// Read a template document.
pub fn load_template(path: impl AsRef<Path>) -> Result<TemplateConfig, EngineError> {
    read_json(path)
}

/// Instances are stored as a bare JSON array.
pub fn load_instances(path: impl AsRef<Path>) -> Result<Vec<ComponentInstance>, EngineError> {
    read_json(path)
}

/// Data is stored as `{"statblock": {...}, "custom": {...}}`.
pub fn load_data(path: impl AsRef<Path>) -> Result<DataSources, EngineError> {
    read_json(path)
}
