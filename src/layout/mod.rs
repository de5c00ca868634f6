//! Layout layer - Home regions, measurement, and pagination
//!
//! Everything between a document model and the per-column render
//! descriptors a renderer draws.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (Px, RegionLocation)
//! - `page`: PageMetrics - pixel geometry of a page and its columns
//! - `home_region`: baseline (page, column) per instance and walk order keys
//! - `content`: renderer-neutral content extracted from component data
//! - `measurement`: SizeOracle trait and the measurement harness
//! - `text_metrics`: font-metrics SizeOracle for headless use
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `region_content`: RegionListContent - one list segment
//! - `pagination`: column flow and list splitting
//! - `canvas`: CanvasLayout - per page/column render descriptors

pub mod canvas;
pub mod content;
pub mod height_index;
pub mod home_region;
pub mod measurement;
pub mod page;
pub mod pagination;
pub mod region_content;
pub mod text_metrics;
pub mod types;

pub use canvas::{CanvasLayout, ColumnLayout, PageLayout, RegionEntry};
pub use content::{extract_content, ComponentContent, ListContent, ListItem};
pub use height_index::HeightIndex;
pub use home_region::{compute_home_regions, HomeRegionAssignment, HomeRegionMap};
pub use measurement::{
    measure_component, BlockRole, ComponentMeasurement, ListMeasurement, MeasureRequest, Measured,
    Measurement, MeasurementContext, MeasurementRecord, MeasurementState, MeasurementStore, Size,
    SizeOracle,
};
pub use page::PageMetrics;
pub use pagination::{paginate, FlowBody, FlowItem, FlowList, PageGeometry, PaginationResult, Placement};
pub use region_content::RegionListContent;
pub use text_metrics::{FontMetrics, TextMetricsOracle};
pub use types::{Px, RegionLocation};
