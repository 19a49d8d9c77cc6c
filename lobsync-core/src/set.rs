//! Price level set for one side of the book.

use crate::level::{PriceLevel, SortOrder};
use crate::tolerance::{approx_eq, is_zero};

/// A collection of price levels keyed by price.
///
/// Levels are kept sorted ascending by price. At most one level exists per
/// price (within [`approx_eq`] tolerance) and no stored level has zero size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceLevelSet {
    levels: Vec<PriceLevel>,
}

impl PriceLevelSet {
    /// Creates an empty level set.
    #[must_use]
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Creates an empty level set with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            levels: Vec::with_capacity(capacity),
        }
    }

    /// Builds a level set by upserting each level in order.
    ///
    /// Zero-size entries are dropped and duplicate prices resolve to the last
    /// entry, so unclean snapshot input still yields a valid set.
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = PriceLevel>,
    {
        let mut set = Self::new();
        set.extend(levels);
        set
    }

    /// Replaces or clears the level at `level.price`.
    ///
    /// Every stored level whose price matches within tolerance is removed. If
    /// `level.size` is non-zero, `level` is then inserted. Deleting a price
    /// that is not present is a no-op.
    #[inline]
    pub fn upsert_or_delete(&mut self, level: PriceLevel) {
        let (start, end) = self.matching_range(level.price);
        if is_zero(level.size) {
            self.levels.drain(start..end);
        } else {
            self.levels.splice(start..end, std::iter::once(level));
        }
    }

    /// Returns up to `k` levels sorted by price in the requested direction.
    #[must_use]
    pub fn top_k(&self, k: usize, order: SortOrder) -> Vec<PriceLevel> {
        match order {
            SortOrder::Ascending => self.levels.iter().take(k).copied().collect(),
            SortOrder::Descending => self.levels.iter().rev().take(k).copied().collect(),
        }
    }

    /// Returns the first level in the requested direction.
    #[inline]
    #[must_use]
    pub fn best(&self, order: SortOrder) -> Option<PriceLevel> {
        match order {
            SortOrder::Ascending => self.levels.first().copied(),
            SortOrder::Descending => self.levels.last().copied(),
        }
    }

    /// Returns the level matching `price` within tolerance.
    #[must_use]
    pub fn get(&self, price: f64) -> Option<&PriceLevel> {
        let (start, end) = self.matching_range(price);
        self.levels[start..end].first()
    }

    /// Removes and returns every level priced strictly below `price`.
    pub fn drain_below(&mut self, price: f64) -> Vec<PriceLevel> {
        let split = self.levels.partition_point(|l| l.price < price);
        self.levels.drain(..split).collect()
    }

    /// Removes and returns every level priced strictly above `price`.
    pub fn drain_above(&mut self, price: f64) -> Vec<PriceLevel> {
        let split = self.levels.partition_point(|l| l.price <= price);
        self.levels.drain(split..).collect()
    }

    /// Clears all levels.
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Returns the number of price levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if there are no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates over all levels in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.iter()
    }

    /// Index range of stored levels matching `price` within tolerance.
    ///
    /// Matches are contiguous because the vector is sorted, so the scan starts
    /// at the insertion point and widens in both directions.
    fn matching_range(&self, price: f64) -> (usize, usize) {
        let pos = self.levels.partition_point(|l| l.price < price);

        let mut start = pos;
        while start > 0 && approx_eq(self.levels[start - 1].price, price) {
            start -= 1;
        }

        let mut end = pos;
        while end < self.levels.len() && approx_eq(self.levels[end].price, price) {
            end += 1;
        }

        (start, end)
    }
}

impl Extend<PriceLevel> for PriceLevelSet {
    fn extend<I: IntoIterator<Item = PriceLevel>>(&mut self, iter: I) {
        for level in iter {
            self.upsert_or_delete(level);
        }
    }
}

impl FromIterator<PriceLevel> for PriceLevelSet {
    fn from_iter<I: IntoIterator<Item = PriceLevel>>(iter: I) -> Self {
        Self::from_levels(iter)
    }
}
