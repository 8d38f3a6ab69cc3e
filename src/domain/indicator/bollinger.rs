//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: rolling mean over n periods
//! - Upper: Middle + (k × StdDev)
//! - Lower: Middle - (k × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by n-1).
//!
//! Default parameters: window=20, k=2.0
//! Warmup: first (window-1) rows are NaN.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_K: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(values: &[f64], window: usize, k: f64) -> BollingerBands {
    let middle = calculate_sma(values, window);
    let stddev = calculate_stddev(values, window);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + k * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - k * s)
        .collect();

    BollingerBands {
        middle,
        upper,
        lower,
    }
}
