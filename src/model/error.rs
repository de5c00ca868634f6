//! Error types for canvas-layout.
//!
//! Two families live here:
//!
//! - [`LayoutIssue`] - non-fatal problems found while laying out a page. They are
//!   collected on the resulting layout and logged; the affected component is
//!   omitted or flagged, the rest of the page still lays out.
//! - [`EngineError`] / [`DataError`] - failures at the crate boundary (bad patch
//!   targets, unreadable documents, config and logging setup). These propagate
//!   with `?`.

use super::identifiers::{ComponentId, SlotId};
use crate::config::loader::ConfigError;
use crate::layout::types::Px;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Non-fatal layout problem attached to a single component.
///
/// # Recovery Behavior
///
/// - **MissingData**: component renders nothing
/// - **MeasurementPending**: retried on the next pass, never shown to users
/// - **SlotNotFound** / **Unplaceable**: instance excluded from layout
/// - **ColumnOverflow**: placed anyway with `region_overflow = true`
/// - **MeasurementWidthMismatch**: measurement discarded and retaken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutIssue {
    /// The component's data reference resolved to nothing.
    #[error("component {component} has no data at {data_ref}")]
    MissingData {
        /// Affected component.
        component: ComponentId,
        /// The reference, rendered for display.
        data_ref: String,
    },

    /// The measurement layer has not produced a size yet.
    #[error("measurement pending for component {0}")]
    MeasurementPending(ComponentId),

    /// The instance names a slot the current template does not have.
    #[error("component {component} references unknown slot {slot}")]
    SlotNotFound {
        /// Affected component.
        component: ComponentId,
        /// Slot it asked for.
        slot: SlotId,
    },

    /// The instance has neither a slot, a position, nor an explicit location.
    #[error("component {0} has no slot, position or location")]
    Unplaceable(ComponentId),

    /// A single item (or an atomic component) is taller than a whole column.
    #[error(
        "component {component} {} needs {height} but a column holds {capacity}",
        item_label(.item_index)
    )]
    ColumnOverflow {
        /// Affected component.
        component: ComponentId,
        /// Offending list item; `None` for an atomic component.
        item_index: Option<usize>,
        /// Height that did not fit.
        height: Px,
        /// Height of an empty column.
        capacity: Px,
    },

    /// Hidden measurement width diverged from the visible pre-transform width.
    #[error(
        "component {component} was measured at {measured_width} but its column is {column_width}"
    )]
    MeasurementWidthMismatch {
        /// Affected component.
        component: ComponentId,
        /// Width the measurement was taken at.
        measured_width: Px,
        /// Current pre-scale column width.
        column_width: Px,
    },
}

fn item_label(item_index: &Option<usize>) -> String {
    match item_index {
        Some(index) => format!("item {index}"),
        None => "(whole)".to_string(),
    }
}

impl LayoutIssue {
    /// The component this issue is about.
    pub fn component(&self) -> &ComponentId {
        match self {
            LayoutIssue::MissingData { component, .. }
            | LayoutIssue::SlotNotFound { component, .. }
            | LayoutIssue::ColumnOverflow { component, .. }
            | LayoutIssue::MeasurementWidthMismatch { component, .. } => component,
            LayoutIssue::MeasurementPending(component) | LayoutIssue::Unplaceable(component) => {
                component
            }
        }
    }

    /// Transient issues are expected to clear on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LayoutIssue::MeasurementPending(_) | LayoutIssue::MeasurementWidthMismatch { .. }
        )
    }
}

/// Failures applying an update through the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A path segment walks into a value that cannot hold children.
    #[error("cannot write through {path}: segment '{segment}' is not a container")]
    PathConflict {
        /// Full path written through.
        path: String,
        /// Segment that hit a scalar.
        segment: String,
    },

    /// An array index in the path is out of range.
    #[error("array index {index} out of range at {path}")]
    IndexOutOfRange {
        /// Full path written through.
        path: String,
        /// Index that was out of range.
        index: usize,
    },
}

/// Top-level error for engine setup and document loading.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No mounted instance has this id.
    #[error("Unknown component {0}")]
    UnknownComponent(ComponentId),

    /// A patch could not be written.
    #[error("Data update failed: {0}")]
    Data(#[from] DataError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// A document file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A document file is not valid JSON for its type.
    #[error("Invalid document {path}: {source}")]
    Document {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
