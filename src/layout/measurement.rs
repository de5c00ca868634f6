//! Size oracle and measurement harness.
//!
//! Sizes come from a [`SizeOracle`], an abstraction over whatever can render
//! text off-screen (a hidden DOM layer, a font-metrics shaper, a test double).
//! The harness asks it for one size per block: the whole component for atomic
//! content; heading, continuation heading, preamble and each item for lists.
//!
//! # Width invariant
//!
//! Every request is made at [`MeasurementContext::measurement_width`], the
//! column width *before* any display-only scale. Measuring at a scaled width
//! wraps text differently from the visible layer and yields wrong heights, so
//! the visible width is checked against it ([`MeasurementContext::verify_visible_width`])
//! and measurements taken at any other width are rejected
//! ([`MeasurementContext::verify`]).

use super::content::ComponentContent;
use super::types::Px;
use crate::model::{ComponentId, LayoutIssue};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Suffix appended to the heading of continuation segments.
pub const CONTINUATION_SUFFIX: &str = " (cont.)";

/// Tolerance when comparing a visible (scaled, fractional) width with the
/// whole-pixel measurement width.
const WIDTH_TOLERANCE_PX: f64 = 0.5;

/// Typographic role of a measured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRole {
    /// Section heading, continuation headings included.
    Heading,
    /// Mechanics summary above a list's first item.
    Preamble,
    /// One list entry.
    Item,
    /// Atomic component text.
    Body,
}

/// Rendered box of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Size {
    /// Width the block was laid out at.
    pub width: Px,
    /// Height of the wrapped block.
    pub height: Px,
}

impl Size {
    /// Size from its two sides.
    pub fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

/// A single block to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureRequest<'a> {
    /// Typography to use.
    pub role: BlockRole,
    /// Text to wrap. Never empty.
    pub text: &'a str,
}

/// Oracle answer. `Pending` is an explicit "not yet" (hidden layer not
/// mounted, fonts still loading), never a zero size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measured {
    /// The block's size at the requested width.
    Ready(Size),
    /// No answer yet; ask again on a later pass.
    Pending,
}

/// Capability that turns content plus a width constraint into a size.
pub trait SizeOracle {
    /// Size of `request` wrapped at `width`.
    fn measure(&self, request: &MeasureRequest<'_>, width: Px) -> Measured;
}

impl<T: SizeOracle + ?Sized> SizeOracle for &T {
    fn measure(&self, request: &MeasureRequest<'_>, width: Px) -> Measured {
        (**self).measure(request, width)
    }
}

/// Width parameters of the current measurement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementContext {
    /// Pre-scale width of a column.
    pub column_width: Px,
    /// Display-only zoom of the visible layer.
    pub display_scale: f64,
}

impl MeasurementContext {
    /// Context for `column_width`. A non-finite or non-positive scale becomes 1.
    pub fn new(column_width: Px, display_scale: f64) -> Self {
        let display_scale = if display_scale.is_finite() && display_scale > 0.0 {
            display_scale
        } else {
            1.0
        };
        Self {
            column_width,
            display_scale,
        }
    }

    /// The width every oracle request uses. Scale never enters here.
    pub fn measurement_width(&self) -> Px {
        self.column_width
    }

    /// On-screen width of a column after the display transform.
    pub fn visible_width_px(&self) -> f64 {
        f64::from(self.column_width.get()) * self.display_scale
    }

    /// Check a width reported by the visible layer (after its transform)
    /// against the measurement width.
    pub fn verify_visible_width(
        &self,
        component: &ComponentId,
        visible_rendered_width_px: f64,
    ) -> Result<(), LayoutIssue> {
        let pre_transform = visible_rendered_width_px / self.display_scale;
        let expected = f64::from(self.column_width.get());
        if (pre_transform - expected).abs() <= WIDTH_TOLERANCE_PX {
            Ok(())
        } else {
            Err(LayoutIssue::MeasurementWidthMismatch {
                component: component.clone(),
                measured_width: Px::from_measured(pre_transform),
                column_width: self.column_width,
            })
        }
    }

    /// Reject measurements captured at a width other than the current one.
    pub fn verify(&self, measurement: &Measurement) -> Result<(), LayoutIssue> {
        if measurement.width == self.column_width {
            Ok(())
        } else {
            Err(LayoutIssue::MeasurementWidthMismatch {
                component: measurement.component_id.clone(),
                measured_width: measurement.width,
                column_width: self.column_width,
            })
        }
    }
}

/// Heights of a list's parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListMeasurement {
    /// Height of the first segment's heading.
    pub heading: Px,
    /// Height of the heading with the continuation suffix.
    pub continuation_heading: Px,
    /// Zero when the list has no preamble.
    pub preamble: Px,
    /// Height of every item, in array order.
    pub items: Vec<Px>,
}

/// Measured body of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentMeasurement {
    /// Placed in one piece.
    Atomic {
        /// Whole height.
        height: Px,
    },
    /// Split at item boundaries.
    List(ListMeasurement),
}

/// Authoritative size of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// Component measured.
    pub component_id: ComponentId,
    /// Width the oracle was asked to wrap at.
    pub width: Px,
    /// Data generation the measurement reflects.
    pub generation: u64,
    /// Heights found.
    pub body: ComponentMeasurement,
}

/// Flat `{componentId, itemIndex?, width, height}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    /// Component measured.
    pub component_id: ComponentId,
    /// List item the record is for; `None` for the whole component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    /// Measurement width.
    pub width: Px,
    /// Measured height.
    pub height: Px,
}

impl Measurement {
    /// Total height if the component were placed in one piece.
    pub fn total_height(&self) -> Px {
        match &self.body {
            ComponentMeasurement::Atomic { height } => *height,
            ComponentMeasurement::List(list) => {
                list.heading + list.preamble + list.items.iter().copied().sum::<Px>()
            }
        }
    }

    /// One record for the component plus one per list item.
    pub fn records(&self) -> Vec<MeasurementRecord> {
        let mut records = vec![MeasurementRecord {
            component_id: self.component_id.clone(),
            item_index: None,
            width: self.width,
            height: self.total_height(),
        }];
        if let ComponentMeasurement::List(list) = &self.body {
            records.extend(list.items.iter().enumerate().map(|(index, height)| {
                MeasurementRecord {
                    component_id: self.component_id.clone(),
                    item_index: Some(index),
                    width: self.width,
                    height: *height,
                }
            }));
        }
        records
    }
}

/// Outcome of [`measure_component`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementState {
    /// Some block is not measurable yet.
    Pending,
    /// Every block came back ready.
    Ready(Measurement),
}

/// Measure a component's content at the context's measurement width.
///
/// Any pending block makes the whole component pending: a partially measured
/// list would let pagination commit to a split that the next pass undoes.
pub fn measure_component<O>(
    oracle: &O,
    component_id: &ComponentId,
    content: &ComponentContent,
    ctx: &MeasurementContext,
    generation: u64,
) -> MeasurementState
where
    O: SizeOracle + ?Sized,
{
    let width = ctx.measurement_width();
    let height_of = |role: BlockRole, text: &str| -> Option<Px> {
        if text.is_empty() {
            return Some(Px::ZERO);
        }
        match oracle.measure(&MeasureRequest { role, text }, width) {
            Measured::Ready(size) => Some(size.height),
            Measured::Pending => None,
        }
    };

    let body = match content {
        ComponentContent::Fixed { height } => Some(ComponentMeasurement::Atomic { height: *height }),
        ComponentContent::Block { role, text } => {
            height_of(*role, text).map(|height| ComponentMeasurement::Atomic { height })
        }
        ComponentContent::List(list) => (|| {
            let heading = height_of(BlockRole::Heading, list.heading())?;
            let continuation = format!("{}{}", list.heading(), CONTINUATION_SUFFIX);
            let continuation_heading = height_of(BlockRole::Heading, &continuation)?;
            let preamble = match &list.preamble {
                Some(text) => height_of(BlockRole::Preamble, text)?,
                None => Px::ZERO,
            };
            let items = list
                .items
                .iter()
                .map(|item| height_of(BlockRole::Item, &item.text()))
                .collect::<Option<Vec<_>>>()?;
            Some(ComponentMeasurement::List(ListMeasurement {
                heading,
                continuation_heading,
                preamble,
                items,
            }))
        })(),
    };

    match body {
        Some(body) => {
            trace!(component = %component_id, %width, generation, "Measured component");
            MeasurementState::Ready(Measurement {
                component_id: component_id.clone(),
                width,
                generation,
                body,
            })
        }
        None => {
            debug!(component = %component_id, "Measurement pending");
            MeasurementState::Pending
        }
    }
}

/// Latest measurement per component.
#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    entries: BTreeMap<ComponentId, Measurement>,
}

impl MeasurementStore {
    /// Stored measurement of `id`.
    pub fn get(&self, id: &ComponentId) -> Option<&Measurement> {
        self.entries.get(id)
    }

    /// Store `measurement`, replacing the component's previous one.
    pub fn insert(&mut self, measurement: Measurement) {
        self.entries.insert(measurement.component_id.clone(), measurement);
    }

    /// Drop the measurement of `id`.
    pub fn remove(&mut self, id: &ComponentId) -> Option<Measurement> {
        self.entries.remove(id)
    }

    /// A measurement is current when it reflects `generation` at `ctx`'s width.
    pub fn is_current(&self, id: &ComponentId, generation: u64, ctx: &MeasurementContext) -> bool {
        self.entries
            .get(id)
            .is_some_and(|m| m.generation == generation && ctx.verify(m).is_ok())
    }

    /// Forget every measurement.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of components measured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records, in component order.
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.entries.values().flat_map(Measurement::records).collect()
    }
}

#[cfg(test)]
#[path = "measurement_tests.rs"]
mod tests;
