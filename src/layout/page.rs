//! Page geometry derived from [`PageVariables`].

use super::types::Px;
use crate::model::PageVariables;

/// Pixel geometry of one page, as the pagination cursor sees it.
///
/// # Invariants
/// - `column_count >= 1`
/// - `column_width` is the *pre-scale* width: display zoom is never folded in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Full page width in px, before any display scale.
    pub page_width_px: f64,
    /// Full page height in px.
    pub page_height_px: f64,
    /// Columns per page, at least one.
    pub column_count: u32,
    /// Space between adjacent columns.
    pub gutter_px: f64,
    /// Width every column (and every measurement) uses.
    pub column_width: Px,
    /// Capacity of an empty column.
    pub column_height: Px,
}

impl PageMetrics {
    /// Pixel geometry of `page`. Negative lengths clamp to zero.
    pub fn from_variables(page: &PageVariables) -> Self {
        let page_width_px = page.dimensions.width_px().max(0.0);
        let page_height_px = page.dimensions.height_px().max(0.0);
        let column_count = page.columns.effective_count();
        let gutter_px = page.gutter_px().max(0.0);

        let gutters = gutter_px * f64::from(column_count - 1);
        let raw_column_width = ((page_width_px - gutters) / f64::from(column_count)).max(0.0);

        Self {
            page_width_px,
            page_height_px,
            column_count,
            gutter_px,
            // Width rounds down: text must never be measured wider than it renders.
            column_width: Px::new(raw_column_width.floor() as u32),
            column_height: Px::new(page_height_px.floor() as u32),
        }
    }

    /// Left edge of a 1-based column, in page px.
    pub fn column_x(&self, column: u32) -> f64 {
        let index = f64::from(column.clamp(1, self.column_count) - 1);
        index * (f64::from(self.column_width.get()) + self.gutter_px)
    }
}
