//! HeightIndex - prefix sums over list item heights via a Fenwick tree
//!
//! The pagination engine asks one question over and over while splitting a
//! list: "starting at item `s`, how many items fit into `capacity` pixels?"
//! With cumulative heights that is a single lower-bound search.
//!
//! # Complexity
//!
//! - `push` / `set`: O(log n)
//! - `prefix_sum` / `range_sum`: O(log n)
//! - `lower_bound` / `fit_count`: O(log² n)

use super::types::Px;

/// Cumulative heights for an ordered sequence of list items.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (1-indexed internally, 0-indexed API).
    tree: Vec<i64>,
    len: usize,
}

impl HeightIndex {
    /// Creates an empty index with pre-allocated capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use canvas_layout::layout::height_index::HeightIndex;
    /// let index = HeightIndex::with_capacity(16);
    /// assert!(index.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            len: 0,
        }
    }

    /// Builds an index from item heights in order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use canvas_layout::layout::height_index::HeightIndex;
    /// # use canvas_layout::layout::types::Px;
    /// let index = HeightIndex::from_heights(&[Px::new(10), Px::new(20)]);
    /// assert_eq!(index.total(), Px::new(30));
    /// ```
    pub fn from_heights(heights: &[Px]) -> Self {
        let mut index = Self::with_capacity(heights.len());
        for &height in heights {
            index.push(height);
        }
        index
    }

    /// Appends an item.
    pub fn push(&mut self, height: Px) {
        if self.len >= self.tree.len() {
            self.grow();
        }
        let idx = self.len;
        self.len += 1;
        fenwick::array::update(&mut self.tree, idx, i64::from(height.get()));
    }

    /// Doubles the backing storage.
    ///
    /// Higher Fenwick nodes cover ranges that include existing items, so the
    /// tree is rebuilt rather than zero-extended.
    fn grow(&mut self) {
        let heights: Vec<Px> = (0..self.len).map(|i| self.height(i)).collect();
        self.tree = vec![0; self.tree.len().max(1) * 2];
        for (i, height) in heights.into_iter().enumerate() {
            fenwick::array::update(&mut self.tree, i, i64::from(height.get()));
        }
    }

    /// Replaces the height of an existing item.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, height: Px) {
        let current = self.height(index);
        let delta = i64::from(height.get()) - i64::from(current.get());
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of a single item.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn height(&self, index: usize) -> Px {
        let upto = self.prefix_sum(index);
        if index == 0 {
            upto
        } else {
            upto.saturating_sub(self.prefix_sum(index - 1))
        }
    }

    /// Cumulative height of items `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> Px {
        assert!(
            index < self.len,
            "index {} out of bounds (len: {})",
            index,
            self.len
        );
        let sum = fenwick::array::prefix_sum(&self.tree, index);
        Px::new(sum.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Total height of items in `start..end`. Empty ranges sum to zero.
    pub fn range_sum(&self, start: usize, end: usize) -> Px {
        let end = end.min(self.len);
        if start >= end {
            return Px::ZERO;
        }
        let upto = self.prefix_sum(end - 1);
        if start == 0 {
            upto
        } else {
            upto.saturating_sub(self.prefix_sum(start - 1))
        }
    }

    /// First index whose cumulative height exceeds `value`, or `None` when the
    /// whole sequence fits within `value`.
    pub fn lower_bound(&self, value: Px) -> Option<usize> {
        let mut left = 0;
        let mut right = self.len;
        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        if left >= self.len {
            None
        } else {
            Some(left)
        }
    }

    /// How many consecutive items starting at `start` fit into `capacity`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use canvas_layout::layout::height_index::HeightIndex;
    /// # use canvas_layout::layout::types::Px;
    /// let index = HeightIndex::from_heights(&[Px::new(10), Px::new(20), Px::new(15)]);
    /// assert_eq!(index.fit_count(0, Px::new(30)), 2);
    /// assert_eq!(index.fit_count(1, Px::new(30)), 1);
    /// assert_eq!(index.fit_count(1, Px::new(35)), 2);
    /// assert_eq!(index.fit_count(0, Px::new(5)), 0);
    /// ```
    pub fn fit_count(&self, start: usize, capacity: Px) -> usize {
        if start >= self.len {
            return 0;
        }
        let base = if start == 0 {
            Px::ZERO
        } else {
            self.prefix_sum(start - 1)
        };
        match self.lower_bound(base.saturating_add(capacity)) {
            Some(first_over) => first_over.saturating_sub(start),
            None => self.len - start,
        }
    }

    /// Total height of all items.
    pub fn total(&self) -> Px {
        if self.is_empty() {
            Px::ZERO
        } else {
            self.prefix_sum(self.len - 1)
        }
    }

    /// Number of items indexed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no items are indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
