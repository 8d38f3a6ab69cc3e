//! Rolling Standard Deviation.
//!
//! Sample standard deviation (divides by n-1) over n values.
//! STDDEV(n)[i] = sqrt(sum((X[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) rows are NaN. A window of 1 is always NaN.

use super::sma::calculate_sma;

pub fn calculate_stddev(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; values.len()];
    }

    let means = calculate_sma(values, window);

    means
        .iter()
        .enumerate()
        .map(|(i, &mean)| {
            if mean.is_nan() {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            let variance: f64 = slice
                .iter()
                .map(|x| {
                    let diff = x - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            variance.sqrt()
        })
        .collect()
}
