//! Pagination and overflow.
//!
//! Walks instances in home-region order and pours them into columns. Atomic
//! components move whole to the next column when they do not fit; lists are
//! split at item boundaries into [`RegionListContent`] segments.
//!
//! # Cursor model
//!
//! A single cursor moves forward through (page, column) in reading order. An
//! instance whose home region lies ahead of the cursor pulls the cursor
//! forward; one whose home region is behind it (because earlier content
//! overflowed past it) is placed at the cursor. The cursor never moves back,
//! so placements never overlap.
//!
//! The pass is a pure function of its inputs: identical inputs give an
//! identical placement sequence.

use super::height_index::HeightIndex;
use super::home_region::HomeRegionAssignment;
use super::region_content::RegionListContent;
use super::types::{Px, RegionLocation};
use crate::model::{ComponentId, LayoutIssue, ListKind};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Column geometry the cursor walks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    /// Columns on each page, at least one.
    pub columns_per_page: u32,
    /// Capacity of an empty column.
    pub column_height: Px,
}

/// Measured list ready for splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowList {
    /// Which list; carried into every segment.
    pub kind: ListKind,
    /// Heading height of the first segment.
    pub heading: Px,
    /// Heading height of every later segment.
    pub continuation_heading: Px,
    /// Preamble height, placed with the first item.
    pub preamble: Px,
    /// Height of each item.
    pub item_heights: Vec<Px>,
    /// Raw items, same length and order as `item_heights`.
    pub items: Vec<Value>,
    /// Handed to the first segment only.
    pub metadata: Option<Value>,
}

/// What the walk places for one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowBody {
    /// Never split.
    Atomic {
        /// Whole height.
        height: Px,
    },
    /// Split at item boundaries.
    List(FlowList),
}

/// One instance entering the pagination walk.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowItem {
    /// Instance being placed.
    pub instance_id: ComponentId,
    /// Where the walk may start placing it.
    pub home: HomeRegionAssignment,
    /// Measured content.
    pub body: FlowBody,
}

/// A component, or a segment of one, placed in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Instance placed.
    pub instance_id: ComponentId,
    /// Column the placement landed in.
    pub location: RegionLocation,
    /// Distance from the column top.
    pub y_offset: Px,
    /// Height occupied.
    pub height: Px,
    /// Segment placed here, for lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<RegionListContent>,
    /// Set when the placement is taller than a whole column.
    pub region_overflow: bool,
}

/// Output of [`paginate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationResult {
    /// In walk order; within a column, in increasing `y_offset`.
    pub placements: Vec<Placement>,
    /// Last page the walk touched.
    pub page_count: u32,
    /// Overflows found during the walk.
    pub issues: Vec<LayoutIssue>,
}

impl PaginationResult {
    /// Placements belonging to one instance, in order.
    pub fn placements_for<'a>(
        &'a self,
        id: &ComponentId,
    ) -> impl Iterator<Item = &'a Placement> + 'a {
        let id = id.clone();
        self.placements.iter().filter(move |p| p.instance_id == id)
    }
}

struct Cursor {
    geometry: PageGeometry,
    location: RegionLocation,
    used: Px,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            location: RegionLocation::FIRST,
            used: Px::ZERO,
        }
    }

    fn remaining(&self) -> Px {
        self.geometry.column_height.saturating_sub(self.used)
    }

    /// Nothing with height has been placed in the current column.
    fn column_is_empty(&self) -> bool {
        self.used.is_zero()
    }

    /// Jump forward to `home` if it lies ahead.
    fn enter(&mut self, home: RegionLocation) {
        let home = home.clamp_column(self.geometry.columns_per_page);
        if home > self.location {
            self.location = home;
            self.used = Px::ZERO;
        }
    }

    fn advance(&mut self) {
        self.location = self.location.next(self.geometry.columns_per_page);
        self.used = Px::ZERO;
    }

    /// Consume `height` and return the offset it starts at.
    fn place(&mut self, height: Px) -> Px {
        let y_offset = self.used;
        self.used = self.used.saturating_add(height);
        y_offset
    }
}

/// Lay out `items` over columns of `geometry`.
pub fn paginate(items: &[FlowItem], geometry: PageGeometry) -> PaginationResult {
    let geometry = PageGeometry {
        columns_per_page: geometry.columns_per_page.max(1),
        ..geometry
    };
    let mut ordered: Vec<&FlowItem> = items.iter().collect();
    ordered.sort_by(|a, b| {
        a.home
            .walk_key()
            .cmp(&b.home.walk_key())
            .then_with(|| a.instance_id.cmp(&b.instance_id))
    });

    let mut cursor = Cursor::new(geometry);
    let mut result = PaginationResult::default();

    for item in ordered {
        cursor.enter(item.home.home_region);
        match &item.body {
            FlowBody::Atomic { height } => place_atomic(&mut cursor, item, *height, &mut result),
            FlowBody::List(list) => place_list(&mut cursor, item, list, &mut result),
        }
    }

    result.page_count = result
        .placements
        .iter()
        .map(|p| p.location.page)
        .max()
        .unwrap_or(1);
    result
}

fn place_atomic(cursor: &mut Cursor, item: &FlowItem, height: Px, result: &mut PaginationResult) {
    if height > cursor.remaining() && !cursor.column_is_empty() {
        cursor.advance();
    }
    let region_overflow = height > cursor.geometry.column_height;
    if region_overflow {
        warn!(
            component = %item.instance_id,
            %height,
            capacity = %cursor.geometry.column_height,
            "Component taller than a column; placing with overflow"
        );
        result.issues.push(LayoutIssue::ColumnOverflow {
            component: item.instance_id.clone(),
            item_index: None,
            height,
            capacity: cursor.geometry.column_height,
        });
    }
    let y_offset = cursor.place(height);
    debug!(component = %item.instance_id, location = %cursor.location, %y_offset, %height, "Placed component");
    result.placements.push(Placement {
        instance_id: item.instance_id.clone(),
        location: cursor.location,
        y_offset,
        height,
        content: None,
        region_overflow,
    });
}

fn place_list(cursor: &mut Cursor, item: &FlowItem, list: &FlowList, result: &mut PaginationResult) {
    let total = list.item_heights.len().min(list.items.len());
    if total == 0 {
        debug!(component = %item.instance_id, "Empty list; nothing to place");
        return;
    }
    let index = HeightIndex::from_heights(&list.item_heights[..total]);

    let mut start = 0;
    while start < total {
        let header = if start == 0 {
            list.heading.saturating_add(list.preamble)
        } else {
            list.continuation_heading
        };
        let remaining = cursor.remaining();
        let mut count = if header <= remaining {
            index.fit_count(start, remaining.saturating_sub(header))
        } else {
            0
        };

        let mut region_overflow = false;
        if count == 0 {
            if !cursor.column_is_empty() {
                cursor.advance();
                continue;
            }
            // Not even one item fits an empty column: force it alone.
            count = 1;
            region_overflow = true;
            let height = header.saturating_add(index.height(start));
            warn!(
                component = %item.instance_id,
                item = start,
                %height,
                capacity = %cursor.geometry.column_height,
                "List item taller than a column; placing with overflow"
            );
            result.issues.push(LayoutIssue::ColumnOverflow {
                component: item.instance_id.clone(),
                item_index: Some(start),
                height,
                capacity: cursor.geometry.column_height,
            });
        }

        let end = start + count;
        let height = header.saturating_add(index.range_sum(start, end));
        let y_offset = cursor.place(height);
        let content = RegionListContent::segment(
            list.kind,
            list.items[start..end].to_vec(),
            start,
            total,
            list.metadata.clone(),
        );
        debug!(
            component = %item.instance_id,
            location = %cursor.location,
            start,
            end,
            total,
            continuation = content.is_continuation,
            "Placed list segment"
        );
        result.placements.push(Placement {
            instance_id: item.instance_id.clone(),
            location: cursor.location,
            y_offset,
            height,
            content: Some(content),
            region_overflow,
        });

        start = end;
        if start < total {
            cursor.advance();
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
