//! Document model types (pure).
//!
//! Templates, component instances, data references and the error taxonomy.
//! Everything here is plain data with serde support; no layout logic.

pub mod component;
pub mod data_source;
pub mod error;
pub mod identifiers;
pub mod template;

// Re-export for convenience
pub use component::{ComponentInstance, ComponentLayout, ComponentType, DataRef, ListKind};
pub use data_source::{resolve_data_reference, DataSources, DataStore};
pub use error::{DataError, EngineError, LayoutIssue};
pub use identifiers::{
    ComponentId, InvalidComponentId, InvalidSlotId, InvalidTemplateId, SlotId, TemplateId,
};
pub use template::{
    ColumnSettings, DefaultComponent, DimensionUnit, PageBackground, PageDimensions,
    PageVariables, PaginationSettings, Rect, SlotDefinition, SnapSettings, TemplateConfig,
    TemplateMode,
};
