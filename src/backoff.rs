//! Exponential backoff arithmetic shared by the poller and the retrier.

use std::time::Duration;

/// Calculate `min(base * multiplier^exponent, cap)`.
///
/// The computation happens in millisecond space; overflow saturates at
/// `cap`. A success between failures resets the caller's exponent, so the
/// first retry after a reset always waits the base delay again.
pub fn exponential_delay(base: Duration, multiplier: f64, exponent: u32, cap: Duration) -> Duration {
    // A zero base stays zero: 0.0 * inf is NaN, and NaN.min(cap) would
    // silently jump the delay to the cap.
    if base.is_zero() {
        return Duration::ZERO;
    }

    let exponent = exponent.min(i32::MAX as u32) as i32;
    let raw = base.as_millis() as f64 * multiplier.powi(exponent);
    let capped = raw.min(cap.as_millis() as f64);
    Duration::from_millis(capped as u64)
}
