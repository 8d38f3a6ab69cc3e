//! Adaptive trend: trend/momentum/ADX entry with an initial and trailing stop.
//!
//! Entry on bar i (after a 60-bar lookback and the exit cooldown) requires all of:
//! - close > ema_fast > ema_slow, and ema_fast above its value 3 bars earlier
//! - rsi_min < rsi < rsi_max
//! - adx > adx_min, +DI > di_min and +DI > di_ratio × −DI
//!
//! The only exit is the stop: `max(initial_stop, trailing_stop)` where
//! `initial_stop = entry × (1 − initial_stop_pct)` and the trailing stop
//! `highest_high × (1 − trail_distance_pct)` applies once the best unrealised
//! gain reaches `trail_activate_pct`.
//!
//! EMA, RSI and ADX come from the feature table, which must be built with this
//! strategy's EMA spans (see [`StrategyConfig::feature_config`](super::StrategyConfig::feature_config)).

use std::fmt;
use std::str::FromStr;

use super::{ExitSignal, SignalStrategy};
use crate::domain::features::FeatureRow;

pub const LOOKBACK_BARS: usize = 60;
const RISING_LOOKBACK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPreset {
    Stock,
    Crypto,
}

impl fmt::Display for TrendPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendPreset::Stock => write!(f, "stock"),
            TrendPreset::Crypto => write!(f, "crypto"),
        }
    }
}

impl FromStr for TrendPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(TrendPreset::Stock),
            "crypto" => Ok(TrendPreset::Crypto),
            other => Err(format!("unknown preset '{}' (expected stock or crypto)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveTrendParams {
    pub preset: TrendPreset,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub adx_min: f64,
    pub di_min: f64,
    pub di_ratio: f64,
    pub initial_stop_pct: f64,
    pub trail_activate_pct: f64,
    pub trail_distance_pct: f64,
    pub cooldown_bars: usize,
}

impl AdaptiveTrendParams {
    pub fn stock() -> Self {
        Self {
            preset: TrendPreset::Stock,
            ema_fast: 20,
            ema_slow: 50,
            rsi_min: 51.0,
            rsi_max: 73.0,
            adx_min: 40.0,
            di_min: 30.0,
            di_ratio: 1.5,
            initial_stop_pct: 0.035,
            trail_activate_pct: 0.03,
            trail_distance_pct: 0.13,
            cooldown_bars: 5,
        }
    }

    pub fn crypto() -> Self {
        Self {
            preset: TrendPreset::Crypto,
            ema_fast: 12,
            ema_slow: 26,
            rsi_min: 55.0,
            rsi_max: 70.0,
            adx_min: 50.0,
            di_min: 40.0,
            di_ratio: 2.0,
            initial_stop_pct: 0.02,
            trail_activate_pct: 0.03,
            trail_distance_pct: 0.08,
            cooldown_bars: 8,
        }
    }

    pub fn for_preset(preset: TrendPreset) -> Self {
        match preset {
            TrendPreset::Stock => Self::stock(),
            TrendPreset::Crypto => Self::crypto(),
        }
    }

    /// Stop price for a position entered at `entry` whose highest high so far is `highest`.
    pub fn stop_price(&self, entry: f64, highest: f64) -> f64 {
        let initial = entry * (1.0 - self.initial_stop_pct);
        let max_profit = (highest - entry) / entry;
        if max_profit >= self.trail_activate_pct {
            initial.max(highest * (1.0 - self.trail_distance_pct))
        } else {
            initial
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdaptiveTrend {
    params: AdaptiveTrendParams,
    highest_since_entry: f64,
}

impl AdaptiveTrend {
    pub fn new(params: AdaptiveTrendParams) -> Self {
        Self {
            params,
            highest_since_entry: f64::NAN,
        }
    }
}

impl SignalStrategy for AdaptiveTrend {
    fn name(&self) -> &'static str {
        "adaptive_trend"
    }

    fn parameters(&self) -> Vec<(String, String)> {
        let p = &self.params;
        vec![
            ("preset".into(), p.preset.to_string()),
            ("ema_fast".into(), p.ema_fast.to_string()),
            ("ema_slow".into(), p.ema_slow.to_string()),
            ("rsi_min".into(), p.rsi_min.to_string()),
            ("rsi_max".into(), p.rsi_max.to_string()),
            ("adx_min".into(), p.adx_min.to_string()),
            ("di_min".into(), p.di_min.to_string()),
            ("di_ratio".into(), p.di_ratio.to_string()),
            ("initial_stop_pct".into(), p.initial_stop_pct.to_string()),
            ("trail_activate_pct".into(), p.trail_activate_pct.to_string()),
            ("trail_distance_pct".into(), p.trail_distance_pct.to_string()),
            ("cooldown_bars".into(), p.cooldown_bars.to_string()),
        ]
    }

    fn warmup(&self) -> usize {
        LOOKBACK_BARS
    }

    fn cooldown_bars(&self) -> usize {
        self.params.cooldown_bars
    }

    fn prepare(&mut self, _rows: &[FeatureRow]) {
        self.highest_since_entry = f64::NAN;
    }

    fn should_enter(&self, rows: &[FeatureRow], i: usize) -> bool {
        if i < RISING_LOOKBACK || i >= rows.len() {
            return false;
        }
        let p = &self.params;
        let row = &rows[i];
        let ema_f = row.ema_fast;

        if row.adx.is_nan() || row.ema_slow.is_nan() {
            return false;
        }

        let above_emas = row.bar.close > ema_f && ema_f > row.ema_slow;
        let rsi_ok = row.rsi > p.rsi_min && row.rsi < p.rsi_max;
        let power_trend = row.adx > p.adx_min;
        let dominant_bullish = row.plus_di > p.di_min && row.plus_di > row.minus_di * p.di_ratio;
        let ema_rising = ema_f > rows[i - RISING_LOOKBACK].ema_fast;

        above_emas && rsi_ok && power_trend && dominant_bullish && ema_rising
    }

    fn on_entry(&mut self, fill_price: f64) {
        self.highest_since_entry = fill_price;
    }

    fn should_exit(&mut self, rows: &[FeatureRow], i: usize, entry_price: f64) -> ExitSignal {
        let Some(row) = rows.get(i) else {
            return ExitSignal::Hold;
        };
        self.highest_since_entry = self.highest_since_entry.max(row.bar.high);
        let stop = self.params.stop_price(entry_price, self.highest_since_entry);

        if row.bar.low <= stop {
            ExitSignal::Stop(stop)
        } else {
            ExitSignal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::test_rows;

    #[test]
    fn presets() {
        let stock = AdaptiveTrendParams::stock();
        assert_eq!((stock.ema_fast, stock.ema_slow, stock.cooldown_bars), (20, 50, 5));
        assert!((stock.trail_distance_pct - 0.13).abs() < f64::EPSILON);

        let crypto = AdaptiveTrendParams::for_preset("Crypto".parse().unwrap());
        assert_eq!(crypto, AdaptiveTrendParams::crypto());
        assert!("forex".parse::<TrendPreset>().is_err());
    }

    #[test]
    fn stop_before_activation_is_initial() {
        let p = AdaptiveTrendParams::stock();
        // highest 102 → 2% gain, below 3% activation
        let stop = p.stop_price(100.0, 102.0);
        assert!((stop - 96.5).abs() < 1e-9);
    }

    #[test]
    fn stop_after_activation_trails_highest() {
        let p = AdaptiveTrendParams::crypto();
        // 50% gain: trailing 150 * 0.92 = 138 beats initial 98
        let stop = p.stop_price(100.0, 150.0);
        assert!((stop - 138.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_never_below_initial() {
        let p = AdaptiveTrendParams::stock();
        // 3% gain activates trail: 103 * 0.87 = 89.61 < 96.5
        let stop = p.stop_price(100.0, 103.0);
        assert!((stop - 96.5).abs() < 1e-9);
    }

    #[test]
    fn exit_tracks_highest_high_across_bars() {
        let rows = test_rows(&[100.0, 120.0, 109.0]);
        let mut strategy = AdaptiveTrend::new(AdaptiveTrendParams::crypto());
        strategy.prepare(&rows);
        strategy.on_entry(100.0);

        // bar 1 high 121: trail at 121 * 0.92 = 111.32, low 119 holds
        assert_eq!(strategy.should_exit(&rows, 1, 100.0), ExitSignal::Hold);
        // bar 2 low 108 breaches 111.32
        match strategy.should_exit(&rows, 2, 100.0) {
            ExitSignal::Stop(stop) => assert!((stop - 121.0 * 0.92).abs() < 1e-9),
            other => panic!("expected stop, got {:?}", other),
        }
    }

    #[test]
    fn no_entry_without_trend_history() {
        let rows = test_rows(&[100.0; 80]);
        let mut strategy = AdaptiveTrend::new(AdaptiveTrendParams::stock());
        strategy.prepare(&rows);
        // flat prices: ADX undefined, close never above ema_fast
        assert!((0..80).all(|i| !strategy.should_enter(&rows, i)));
    }

    #[test]
    fn enters_on_strong_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let mut rows = test_rows(&closes);
        for row in &mut rows {
            row.rsi = 60.0;
        }
        let mut strategy = AdaptiveTrend::new(AdaptiveTrendParams::stock());
        strategy.prepare(&rows);
        assert!(strategy.should_enter(&rows, 70));

        for row in &mut rows {
            row.rsi = 80.0;
        }
        assert!(!strategy.should_enter(&rows, 70));
    }

    #[test]
    fn entry_reads_trend_columns() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let mut rows = test_rows(&closes);
        for row in &mut rows {
            row.rsi = 60.0;
        }
        let strategy = AdaptiveTrend::new(AdaptiveTrendParams::stock());
        assert!(strategy.should_enter(&rows, 70));

        let mut weak = rows.clone();
        weak[70].adx = 30.0;
        assert!(!strategy.should_enter(&weak, 70));

        let mut flat_ema = rows.clone();
        flat_ema[67].ema_fast = flat_ema[70].ema_fast;
        assert!(!strategy.should_enter(&flat_ema, 70));
    }
}
