//! # lobsync Bench
//!
//! Deterministic book fixtures for benchmarking.

use lobsync_core::PriceLevel;
use lobsync_engine::{BookSnapshot, DiffEvent};

/// Price increment between adjacent fixture levels.
pub const TICK: f64 = 0.5;

/// Builds a snapshot with `depth` levels per side around `mid`.
#[must_use]
pub fn snapshot(depth: u32, mid: f64) -> BookSnapshot {
    BookSnapshot {
        bids: (1..=depth)
            .map(|i| PriceLevel::new(mid - f64::from(i) * TICK, 1.0 + f64::from(i % 7)))
            .collect(),
        asks: (1..=depth)
            .map(|i| PriceLevel::new(mid + f64::from(i) * TICK, 1.0 + f64::from(i % 5)))
            .collect(),
        reference_price: mid,
    }
}

/// Builds `count` diffs that touch levels within `depth` ticks of `mid`.
///
/// Every seventh diff deletes a level and every eleventh moves the reference
/// price by one tick, so replay exercises upserts, deletes and
/// reclassification.
#[must_use]
pub fn diffs(count: u32, depth: u32, mid: f64) -> Vec<DiffEvent> {
    let depth = depth.max(1);
    (0..count)
        .map(|n| {
            let offset = f64::from(n % depth + 1) * TICK;
            let size = if n % 7 == 0 { 0.0 } else { f64::from(n % 13) + 0.5 };
            let diff = DiffEvent::levels(
                vec![PriceLevel::new(mid - offset, size)],
                vec![PriceLevel::new(mid + offset, size)],
            );
            if n % 11 == 0 {
                let shift = if n % 22 == 0 { TICK } else { -TICK };
                diff.with_reference_price(mid + shift)
            } else {
                diff
            }
        })
        .collect()
}
