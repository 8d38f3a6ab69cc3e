//! Technical indicator implementations.
//!
//! Every indicator is a pure function from an input series (or bar slice) to
//! output columns of the same length. Rows without enough history are `NaN`
//! rather than an error, and a `NaN` input never panics: it either propagates
//! through the affected window or is skipped, as documented per indicator.
//!
//! - [`smma`]: recursive smoothed moving average
//! - [`ema`]: exponential moving average without bias correction
//! - [`sma`]: simple rolling mean
//! - [`stddev`]: rolling sample standard deviation
//! - [`rsi`]: relative strength index with exponentially weighted averages
//! - [`bollinger`]: Bollinger bands over the rolling mean / sample stddev
//! - [`adx`]: average directional index with +DI / -DI

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod smma;
pub mod stddev;

pub use adx::{calculate_adx, AdxSeries};
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use smma::calculate_smma;
pub use stddev::calculate_stddev;

/// Percentage distance of `value` from `reference`: `(value / reference - 1) * 100`.
///
/// `NaN` whenever either side is undefined or the reference is zero.
pub fn pct_distance(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return f64::NAN;
    }
    (value / reference - 1.0) * 100.0
}

#[cfg(test)]
pub(crate) fn assert_nan_prefix(values: &[f64], count: usize) {
    for (i, v) in values.iter().take(count).enumerate() {
        assert!(v.is_nan(), "row {} should be undefined, got {}", i, v);
    }
}
