//! Canvas layout and pagination engine for statblock documents.
//!
//! Lays semantic components (identity headers, stat tables, action lists,
//! spellcasting blocks, ...) onto fixed-size, multi-column pages and splits
//! overflowing lists across columns and pages at item boundaries.
//!
//! The crate is split into a pure core and a thin driver:
//!
//! - `model`: templates, component instances, data references, errors
//! - `layout`: home regions, measurement, pagination, render descriptors
//! - `editing`: edit locks and the per-component lifecycle
//! - `engine`: the single-writer pipeline tying them together
//! - `config`, `logging`, `document`: ambient setup for hosts and the CLI

pub mod config;
pub mod document;
pub mod editing;
pub mod engine;
pub mod layout;
pub mod logging;
pub mod model;

pub use engine::{CanvasEngine, EngineOptions};
pub use layout::{CanvasLayout, SizeOracle, TextMetricsOracle};
