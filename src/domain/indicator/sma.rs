//! Simple Moving Average (rolling mean).
//!
//! SMA(n)[i] = mean(X[i-n+1..=i]).
//! Warmup: first (n-1) rows are NaN; a NaN anywhere in the window yields NaN.

pub fn calculate_sma(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let warmup = window - 1;
    (0..values.len())
        .map(|i| {
            if i < warmup {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            slice.iter().sum::<f64>() / window as f64
        })
        .collect()
}
