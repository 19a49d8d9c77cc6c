//! # lobsync Core
//!
//! Core types for maintaining one side of a price-level order book.
//!
//! This crate provides:
//! - [`PriceLevel`] and the [`Side`] / [`SortOrder`] enums
//! - Epsilon-tolerant float comparison for price keys and sizes
//! - [`PriceLevelSet`], a sorted set of levels with upsert-or-delete semantics

pub mod level;
pub mod set;
pub mod tolerance;

pub use level::{PriceLevel, Side, SortOrder};
pub use set::PriceLevelSet;
pub use tolerance::{ABSOLUTE_EPSILON, PRICE_RELATIVE_EPSILON, approx_eq, is_zero};
