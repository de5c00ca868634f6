//! Segment of a list placed in one region.

use super::measurement::CONTINUATION_SUFFIX;
use crate::model::ListKind;
use serde::Serialize;
use serde_json::Value;

/// A contiguous run of list items rendered in one column.
///
/// The segments of one list partition its items exactly once and in order.
/// Only the first segment carries `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionListContent {
    /// Which list the segment belongs to.
    pub kind: ListKind,
    /// Raw items of this segment.
    pub items: Vec<Value>,
    /// Index of `items[0]` in the full list.
    pub start_index: usize,
    /// Length of the full list.
    pub total_count: usize,
    /// True for every segment but the first.
    pub is_continuation: bool,
    /// List-level fields other than the items; first segment only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl RegionListContent {
    /// Build a segment. Continuation status follows from `start_index`.
    pub fn segment(
        kind: ListKind,
        items: Vec<Value>,
        start_index: usize,
        total_count: usize,
        metadata: Option<Value>,
    ) -> Self {
        let is_continuation = start_index > 0;
        Self {
            kind,
            items,
            start_index,
            total_count,
            is_continuation,
            metadata: if is_continuation { None } else { metadata },
        }
    }

    /// Index one past the last item in this segment.
    pub fn end_index(&self) -> usize {
        self.start_index + self.items.len()
    }

    /// Heading to render above the segment.
    pub fn heading(&self) -> String {
        if self.is_continuation {
            format!("{}{}", self.kind.base_heading(), CONTINUATION_SUFFIX)
        } else {
            self.kind.base_heading().to_string()
        }
    }
}
