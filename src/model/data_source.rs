//! Data source resolution.
//!
//! The layout engine only ever *reads* data through [`DataStore::resolve`].
//! Writes come from inline editors and go through [`DataStore::apply_update`],
//! which applies a JSON merge patch (RFC 7386) at the referenced location.

use super::component::DataRef;
use super::error::DataError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seam between the engine and whatever owns the document data.
pub trait DataStore {
    /// Resolve a reference. `None` means missing (or JSON `null`).
    fn resolve(&self, data_ref: &DataRef) -> Option<&Value>;

    /// Apply a partial update at the reference.
    fn apply_update(&mut self, data_ref: &DataRef, patch: &Value) -> Result<(), DataError>;
}

/// In-memory data sources: one statblock document plus free-form custom values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    /// The statblock document.
    #[serde(default)]
    pub statblock: Value,
    /// Values addressed by [`DataRef::Custom`].
    #[serde(default)]
    pub custom: Map<String, Value>,
}

impl DataSources {
    /// Sources holding `statblock` and no custom values.
    pub fn new(statblock: Value) -> Self {
        Self {
            statblock,
            custom: Map::new(),
        }
    }
}

/// Resolve a data reference against the supplied sources.
pub fn resolve_data_reference<'a>(sources: &'a DataSources, data_ref: &DataRef) -> Option<&'a Value> {
    let value = match data_ref {
        DataRef::Statblock { path } => path_segments(path)
            .try_fold(&sources.statblock, |current, segment| child(current, segment))?,
        DataRef::Custom { key } => sources.custom.get(key)?,
    };
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

impl DataStore for DataSources {
    fn resolve(&self, data_ref: &DataRef) -> Option<&Value> {
        resolve_data_reference(self, data_ref)
    }

    fn apply_update(&mut self, data_ref: &DataRef, patch: &Value) -> Result<(), DataError> {
        let target = match data_ref {
            DataRef::Statblock { path } => child_mut_creating(&mut self.statblock, path)?,
            DataRef::Custom { key } => self.custom.entry(key.clone()).or_insert(Value::Null),
        };
        merge_patch(target, patch);
        Ok(())
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Walk `path` mutably, creating empty objects for missing keys.
fn child_mut_creating<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value, DataError> {
    let mut current = root;
    for segment in path_segments(path) {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| DataError::PathConflict {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })?;
                items.get_mut(index).ok_or(DataError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                })?
            }
            _ => {
                return Err(DataError::PathConflict {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
    }
    Ok(current)
}

/// RFC 7386 JSON merge patch.
fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
