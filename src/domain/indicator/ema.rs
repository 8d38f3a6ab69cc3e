//! Exponential Moving Average.
//!
//! k = 2/(span+1), EMA[0] = X[0], then EMA[i] = X[i]*k + EMA[i-1]*(1-k).
//! No warmup and no bias correction; the output is defined from the first row.
//! Non-finite inputs are handled the same way as in [`super::smma`].

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = f64::NAN;

    for (i, &x) in values.iter().enumerate() {
        let v = if i == 0 || !prev.is_finite() {
            x
        } else if !x.is_finite() {
            prev
        } else {
            x * k + prev * (1.0 - k)
        };
        out.push(v);
        prev = v;
    }

    out
}
