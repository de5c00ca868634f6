//! Font-metrics size oracle.
//!
//! Used where no rendering surface is available (the inspection binary,
//! benchmarks, server-side pre-pagination). Text is wrapped greedily on word
//! boundaries using `unicode-width` cell widths, so wide glyphs count double.

use super::measurement::{BlockRole, MeasureRequest, Measured, Size, SizeOracle};
use super::types::Px;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Typographic constants of the statblock font stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FontMetrics {
    /// Average advance of one character cell.
    pub cell_width_px: f64,
    /// Line height of body, preamble and item text.
    pub body_line_height_px: f64,
    /// Line height of section headings.
    pub heading_line_height_px: f64,
    /// Vertical space after each block.
    pub block_spacing_px: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            cell_width_px: 7.0,
            body_line_height_px: 16.0,
            heading_line_height_px: 22.0,
            block_spacing_px: 4.0,
        }
    }
}

impl FontMetrics {
    fn line_height(&self, role: BlockRole) -> f64 {
        match role {
            BlockRole::Heading => self.heading_line_height_px,
            BlockRole::Preamble | BlockRole::Item | BlockRole::Body => self.body_line_height_px,
        }
    }

    /// Character cells that fit on one line of `width`.
    pub fn columns_for(&self, width: Px) -> usize {
        if self.cell_width_px <= 0.0 || !self.cell_width_px.is_finite() {
            return 1;
        }
        ((f64::from(width.get()) / self.cell_width_px).floor() as usize).max(1)
    }
}

/// [`SizeOracle`] backed by [`FontMetrics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetricsOracle {
    metrics: FontMetrics,
    fonts_ready: bool,
}

impl TextMetricsOracle {
    /// An oracle with fonts already loaded.
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            fonts_ready: true,
        }
    }

    /// An oracle whose fonts are still loading. Every request is pending.
    pub fn loading(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            fonts_ready: false,
        }
    }

    /// Flip once the host's fonts finish loading.
    pub fn set_fonts_ready(&mut self, ready: bool) {
        self.fonts_ready = ready;
    }

    /// Metrics this oracle wraps text with.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }
}

impl Default for TextMetricsOracle {
    fn default() -> Self {
        Self::new(FontMetrics::default())
    }
}

impl SizeOracle for TextMetricsOracle {
    fn measure(&self, request: &MeasureRequest<'_>, width: Px) -> Measured {
        if !self.fonts_ready {
            return Measured::Pending;
        }
        let columns = self.metrics.columns_for(width);
        let lines = count_wrapped_lines(request.text, columns);
        if lines == 0 {
            return Measured::Ready(Size::new(width, Px::ZERO));
        }
        let height = lines as f64 * self.metrics.line_height(request.role)
            + self.metrics.block_spacing_px;
        Measured::Ready(Size::new(width, Px::from_measured(height)))
    }
}

/// Lines `text` occupies when greedily wrapped at `columns` cells.
///
/// Empty text occupies no lines; blank lines inside text occupy one. Words
/// wider than a line are broken across as many lines as they need.
pub fn count_wrapped_lines(text: &str, columns: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    let columns = columns.max(1);
    text.split('\n')
        .map(|line| wrap_line(line, columns))
        .sum()
}

fn wrap_line(line: &str, columns: usize) -> usize {
    let mut lines = 1;
    let mut current = 0usize;
    for word in line.split_whitespace() {
        let width = word.width();
        if current > 0 && current + 1 + width <= columns {
            current += 1 + width;
            continue;
        }
        if current > 0 {
            lines += 1;
        }
        if width > columns {
            let extra = (width - 1) / columns;
            lines += extra;
            current = width - extra * columns;
        } else {
            current = width;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: BlockRole, text: &str) -> MeasureRequest<'_> {
        MeasureRequest { role, text }
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert_eq!(count_wrapped_lines("", 10), 0);
    }

    #[test]
    fn short_line_is_one_line() {
        assert_eq!(count_wrapped_lines("Bite", 10), 1);
    }

    #[test]
    fn words_wrap_at_column_limit() {
        // "aaaa bbbb" fits exactly in 9 cells, "cc" goes to the next line.
        assert_eq!(count_wrapped_lines("aaaa bbbb cc", 9), 2);
        assert_eq!(count_wrapped_lines("aaaa bbbb cc", 12), 1);
    }

    #[test]
    fn blank_lines_count() {
        assert_eq!(count_wrapped_lines("one\n\ntwo", 10), 3);
    }

    #[test]
    fn long_word_is_broken() {
        // 25 cells at 10 per line: 10 + 10 + 5
        assert_eq!(count_wrapped_lines(&"x".repeat(25), 10), 3);
        // The 5-cell tail leaves room for a short word.
        assert_eq!(count_wrapped_lines(&format!("{} ab", "x".repeat(25)), 10), 3);
    }

    #[test]
    fn wide_glyphs_take_two_cells() {
        assert_eq!(count_wrapped_lines("龍龍龍", 4), 2);
    }

    #[test]
    fn height_uses_role_line_height_plus_spacing() {
        let oracle = TextMetricsOracle::default();
        let body = oracle.measure(&request(BlockRole::Item, "Bite"), Px::new(350));
        let heading = oracle.measure(&request(BlockRole::Heading, "Actions"), Px::new(350));
        assert_eq!(body, Measured::Ready(Size::new(Px::new(350), Px::new(20))));
        assert_eq!(heading, Measured::Ready(Size::new(Px::new(350), Px::new(26))));
    }

    #[test]
    fn narrower_width_is_taller() {
        let oracle = TextMetricsOracle::default();
        let text = "The dragon exhales fire in a 60-foot cone. Each creature in that area must make a saving throw.";
        let Measured::Ready(wide) = oracle.measure(&request(BlockRole::Item, text), Px::new(700)) else {
            panic!("expected ready");
        };
        let Measured::Ready(narrow) = oracle.measure(&request(BlockRole::Item, text), Px::new(140)) else {
            panic!("expected ready");
        };
        assert!(narrow.height > wide.height);
    }

    #[test]
    fn loading_fonts_report_pending() {
        let mut oracle = TextMetricsOracle::loading(FontMetrics::default());
        assert_eq!(
            oracle.measure(&request(BlockRole::Body, "text"), Px::new(300)),
            Measured::Pending
        );
        oracle.set_fonts_ready(true);
        assert!(matches!(
            oracle.measure(&request(BlockRole::Body, "text"), Px::new(300)),
            Measured::Ready(_)
        ));
    }

    #[test]
    fn degenerate_cell_width_still_wraps() {
        let metrics = FontMetrics {
            cell_width_px: 0.0,
            ..FontMetrics::default()
        };
        assert_eq!(metrics.columns_for(Px::new(300)), 1);
    }
}
