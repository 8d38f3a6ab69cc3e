//! RSI (Relative Strength Index) indicator implementation.
//!
//! Gains and losses are smoothed with an exponentially weighted mean
//! (alpha = 1/n, bias-corrected weights):
//! - avg[i] = sum(w_j * x_j) / sum(w_j), w_j = (1 - alpha)^(i - j)
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n rows are NaN (need n price changes). A NaN close skips
//! its price changes but still ages the earlier weights.

pub const DEFAULT_WINDOW: usize = 14;

pub fn calculate_rsi(closes: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if window == 0 || closes.len() < 2 {
        return out;
    }

    let decay = 1.0 - 1.0 / window as f64;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut observations = 0usize;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];

        gain_sum *= decay;
        loss_sum *= decay;
        weight_sum *= decay;

        if !change.is_nan() {
            gain_sum += change.max(0.0);
            loss_sum += (-change).max(0.0);
            weight_sum += 1.0;
            observations += 1;
        }

        if observations < window || weight_sum == 0.0 {
            continue;
        }

        out[i] = rsi_value(gain_sum / weight_sum, loss_sum / weight_sum);
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
