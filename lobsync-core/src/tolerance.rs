//! Floating-point tolerance used to identify price levels.
//!
//! Prices arrive as `f64` from JSON, so two updates for "the same" price may
//! differ in the last few bits. Level identity is decided by [`approx_eq`],
//! which uses a relative bound with an absolute floor near zero.

/// Relative tolerance for price matching.
///
/// Two prices match when they differ by at most this fraction of the larger
/// magnitude. At a price of 1,000,000 that is 0.001.
pub const PRICE_RELATIVE_EPSILON: f64 = 1e-9;

/// Absolute tolerance floor, also used as the zero-size threshold.
pub const ABSOLUTE_EPSILON: f64 = 1e-12;

/// Returns true if `a` and `b` are the same price within tolerance.
#[inline]
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    let bound = (PRICE_RELATIVE_EPSILON * a.abs().max(b.abs())).max(ABSOLUTE_EPSILON);
    diff <= bound
}

/// Returns true if `size` should be treated as an empty level.
#[inline]
#[must_use]
pub fn is_zero(size: f64) -> bool {
    size.abs() <= ABSOLUTE_EPSILON
}
