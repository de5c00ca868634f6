//! Per-page, per-column render descriptors.

use super::home_region::{HomeRegionAssignment, HomeRegionMap};
use super::pagination::PaginationResult;
use super::region_content::RegionListContent;
use super::types::{Px, RegionLocation};
use crate::model::{ComponentId, LayoutIssue};
use serde::Serialize;
use std::collections::BTreeMap;

/// One thing to render in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    /// Component this entry renders.
    pub instance_id: ComponentId,
    /// Top edge within the column.
    pub y_offset: Px,
    /// Height the entry occupies.
    pub height: Px,
    /// The segment to draw, for list components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<RegionListContent>,
    /// Taller than a whole column; drawn clipped and reported as an issue.
    pub region_overflow: bool,
}

/// Entries of one column, top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    /// 1-based column index.
    pub column: u32,
    /// Entries in stacking order.
    pub entries: Vec<RegionEntry>,
}

/// Columns of one page, left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub page: u32,
    /// Every column of the page, empty ones included.
    pub columns: Vec<ColumnLayout>,
}

/// Output of a full layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasLayout {
    /// Baseline region of every placed instance.
    pub home_regions: BTreeMap<ComponentId, HomeRegionAssignment>,
    /// Pages in order, starting at page 1.
    pub pages: Vec<PageLayout>,
    /// Some heights were still pending; a follow-up pass will refine this.
    pub provisional: bool,
    /// Overflow and measurement problems found in the pass.
    #[serde(skip)]
    pub issues: Vec<LayoutIssue>,
}

impl CanvasLayout {
    /// Assemble render descriptors. Every page up to the last used one is
    /// present, each with all of its columns, even when empty.
    pub fn assemble(
        home_regions: &HomeRegionMap,
        pagination: PaginationResult,
        columns_per_page: u32,
        provisional: bool,
        mut issues: Vec<LayoutIssue>,
    ) -> Self {
        let columns_per_page = columns_per_page.max(1);
        let mut by_region: BTreeMap<RegionLocation, Vec<RegionEntry>> = BTreeMap::new();
        for placement in pagination.placements {
            by_region
                .entry(placement.location)
                .or_default()
                .push(RegionEntry {
                    instance_id: placement.instance_id,
                    y_offset: placement.y_offset,
                    height: placement.height,
                    content: placement.content,
                    region_overflow: placement.region_overflow,
                });
        }

        let pages = (1..=pagination.page_count.max(1))
            .map(|page| PageLayout {
                page,
                columns: (1..=columns_per_page)
                    .map(|column| ColumnLayout {
                        column,
                        entries: by_region
                            .remove(&RegionLocation { page, column })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        issues.extend(pagination.issues);
        Self {
            home_regions: home_regions.assignments().clone(),
            pages,
            provisional,
            issues,
        }
    }

    /// Number of pages, never less than one once assembled.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Entries of one column, top to bottom. Empty when out of range.
    pub fn entries_at(&self, page: u32, column: u32) -> &[RegionEntry] {
        self.pages
            .iter()
            .find(|p| p.page == page)
            .and_then(|p| p.columns.iter().find(|c| c.column == column))
            .map(|c| c.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Every (location, entry) for one instance in reading order.
    pub fn entries_for<'a>(
        &'a self,
        id: &ComponentId,
    ) -> impl Iterator<Item = (RegionLocation, &'a RegionEntry)> + 'a {
        let id = id.clone();
        self.pages
            .iter()
            .flat_map(|page| page.columns.iter().map(move |column| (page.page, column)))
            .flat_map(|(page, column)| {
                column
                    .entries
                    .iter()
                    .map(move |entry| (RegionLocation::new(page, column.column), entry))
            })
            .filter(move |(_, entry)| entry.instance_id == id)
    }

    /// Whether any entry overflowed its column.
    pub fn has_overflow(&self) -> bool {
        self.pages
            .iter()
            .flat_map(|p| &p.columns)
            .flat_map(|c| &c.entries)
            .any(|e| e.region_overflow)
    }
}
