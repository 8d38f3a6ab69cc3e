//! Smoothed Moving Average.
//!
//! Seed with the first value, then SMMA[i] = (SMMA[i-1] * (n-1) + X[i]) / n.
//! Strictly sequential: every output depends on the previous one.
//!
//! A non-finite input holds the previous value; a non-finite previous value
//! is reseeded from the next finite input.

pub fn calculate_smma(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let n = window as f64;
    let mut out = Vec::with_capacity(values.len());
    let mut prev = f64::NAN;

    for (i, &x) in values.iter().enumerate() {
        let v = if i == 0 || !prev.is_finite() {
            x
        } else if !x.is_finite() {
            prev
        } else {
            (prev * (n - 1.0) + x) / n
        };
        out.push(v);
        prev = v;
    }

    out
}
