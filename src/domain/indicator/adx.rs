//! ADX: Average Directional Index with +DI / -DI.
//!
//! Steps:
//! 1. +DM = high[i] - high[i-1], -DM = low[i-1] - low[i]; each kept only when
//!    positive and strictly greater than the other, otherwise 0. An outside
//!    bar with equal up and down moves counts for neither side.
//! 2. TR = max(high - low, |high - prev_close|, |low - prev_close|)
//! 3. ATR, mean(+DM), mean(-DM) as simple rolling means over n
//! 4. +DI = 100 * mean(+DM) / ATR, -DI = 100 * mean(-DM) / ATR
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = rolling mean of DX over n
//!
//! DX is NaN when both DI are zero (and DI is NaN when ATR is zero); the NaN
//! flows into ADX for the following n rows instead of raising.

use super::sma::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_WINDOW: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn calculate_adx(bars: &[OhlcvBar], window: usize) -> AdxSeries {
    let n = bars.len();
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = Vec::with_capacity(n);

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            tr.push(bar.true_range(f64::NAN));
            continue;
        }
        let prev = &bars[i - 1];
        let up = bar.high - prev.high;
        let down = prev.low - bar.low;

        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
        tr.push(bar.true_range(prev.close));
    }

    let atr = calculate_sma(&tr, window);
    let plus_di = directional_index(&calculate_sma(&plus_dm, window), &atr);
    let minus_di = directional_index(&calculate_sma(&minus_dm, window), &atr);

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| {
            let sum = p + m;
            if sum == 0.0 || sum.is_nan() {
                f64::NAN
            } else {
                100.0 * (p - m).abs() / sum
            }
        })
        .collect();

    AdxSeries {
        adx: calculate_sma(&dx, window),
        plus_di,
        minus_di,
    }
}

fn directional_index(dm_mean: &[f64], atr: &[f64]) -> Vec<f64> {
    dm_mean
        .iter()
        .zip(atr)
        .map(|(&dm, &atr)| {
            if atr == 0.0 {
                f64::NAN
            } else {
                100.0 * dm / atr
            }
        })
        .collect()
}
