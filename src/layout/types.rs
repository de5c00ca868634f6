//! Core layout newtypes

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A length in whole CSS pixels.
///
/// Oracles report fractional sizes; they enter the layout through
/// [`Px::from_measured`], which rounds up so that a component that "almost"
/// fits is never squeezed into a column it would visibly overrun.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Px(u32);

impl Px {
    /// No height.
    pub const ZERO: Self = Self(0);

    /// Create from a whole pixel count.
    pub const fn new(px: u32) -> Self {
        Self(px)
    }

    /// Convert a fractional measured length, rounding up.
    ///
    /// Negative and NaN inputs clamp to zero.
    pub fn from_measured(px: f64) -> Self {
        if px.is_nan() || px <= 0.0 {
            return Self::ZERO;
        }
        let rounded = px.ceil();
        if rounded >= u32::MAX as f64 {
            Self(u32::MAX)
        } else {
            Self(rounded as u32)
        }
    }

    /// Get the raw pixel count.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Sum, saturating at `u32::MAX`.
    pub fn saturating_add(&self, other: Px) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Difference, saturating at zero.
    pub fn saturating_sub(&self, other: Px) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Whether this is zero pixels.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Px {
    type Output = Px;

    fn add(self, rhs: Px) -> Px {
        self.saturating_add(rhs)
    }
}

impl std::iter::Sum for Px {
    fn sum<I: Iterator<Item = Px>>(iter: I) -> Self {
        iter.fold(Px::ZERO, |acc, px| acc + px)
    }
}

impl std::fmt::Display for Px {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// A (page, column) pair. Both are 1-based, matching how documents address them.
///
/// Ordering is page-major, which is the order the pagination cursor walks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegionLocation {
    /// 1-based page number.
    pub page: u32,
    /// 1-based column within the page.
    pub column: u32,
}

impl RegionLocation {
    /// Page 1, column 1.
    pub const FIRST: Self = Self { page: 1, column: 1 };

    /// Create a location. Zero page/column values are raised to 1.
    pub fn new(page: u32, column: u32) -> Self {
        Self {
            page: page.max(1),
            column: column.max(1),
        }
    }

    /// The next column in reading order, wrapping onto the next page after
    /// the last column.
    pub fn next(&self, columns_per_page: u32) -> Self {
        if self.column >= columns_per_page.max(1) {
            Self {
                page: self.page + 1,
                column: 1,
            }
        } else {
            Self {
                page: self.page,
                column: self.column + 1,
            }
        }
    }

    /// Clamp the column into `1..=columns_per_page`.
    pub fn clamp_column(&self, columns_per_page: u32) -> Self {
        Self::new(self.page, self.column.min(columns_per_page.max(1)))
    }
}

impl Default for RegionLocation {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for RegionLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} column {}", self.page, self.column)
    }
}
