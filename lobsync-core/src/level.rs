//! Price level and side definitions.

use serde::{Deserialize, Serialize};

/// Resting size at one price point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price.
    pub price: f64,
    /// Total size at this price (0 = delete level).
    pub size: f64,
}

impl PriceLevel {
    /// Creates a new price level.
    #[inline]
    #[must_use]
    pub const fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }
}

/// Order book side (bid or ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Bid (buy) side.
    Bid,
    /// Ask (sell) side.
    Ask,
}

impl Side {
    /// Returns the ordering that puts this side's best price first.
    #[inline]
    #[must_use]
    pub const fn best_first(self) -> SortOrder {
        match self {
            Self::Bid => SortOrder::Descending,
            Self::Ask => SortOrder::Ascending,
        }
    }
}

/// Price ordering for level retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Lowest price first.
    Ascending,
    /// Highest price first.
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_best_first() {
        assert_eq!(Side::Bid.best_first(), SortOrder::Descending);
        assert_eq!(Side::Ask.best_first(), SortOrder::Ascending);
    }

    #[test]
    fn test_price_level_deserialize() {
        let level: PriceLevel = serde_json::from_str(r#"{"price": 9500000.0, "size": 0.25}"#)
            .unwrap();
        assert_eq!(level, PriceLevel::new(9_500_000.0, 0.25));
    }

    #[test]
    fn test_price_level_deserialize_integer_price() {
        let level: PriceLevel = serde_json::from_str(r#"{"price": 9500000, "size": 0}"#).unwrap();
        assert_eq!(level.price, 9_500_000.0);
        assert_eq!(level.size, 0.0);
    }
}
