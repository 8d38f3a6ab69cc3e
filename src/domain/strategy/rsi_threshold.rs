//! RSI threshold strategy: enter while RSI is below `buy_threshold`, exit
//! once it rises above `sell_threshold`. Undefined RSI never signals.

use super::{ExitSignal, SignalStrategy};
use crate::domain::features::FeatureRow;

pub const DEFAULT_BUY_THRESHOLD: f64 = 30.0;
pub const DEFAULT_SELL_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiThresholdParams {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for RsiThresholdParams {
    fn default() -> Self {
        Self {
            buy_threshold: DEFAULT_BUY_THRESHOLD,
            sell_threshold: DEFAULT_SELL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RsiThreshold {
    params: RsiThresholdParams,
}

impl RsiThreshold {
    pub fn new(params: RsiThresholdParams) -> Self {
        Self { params }
    }
}

impl SignalStrategy for RsiThreshold {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn parameters(&self) -> Vec<(String, String)> {
        vec![
            ("buy_threshold".into(), self.params.buy_threshold.to_string()),
            ("sell_threshold".into(), self.params.sell_threshold.to_string()),
        ]
    }

    fn prepare(&mut self, _rows: &[FeatureRow]) {}

    fn should_enter(&self, rows: &[FeatureRow], i: usize) -> bool {
        rows.get(i).is_some_and(|r| r.rsi < self.params.buy_threshold)
    }

    fn should_exit(&mut self, rows: &[FeatureRow], i: usize, _entry_price: f64) -> ExitSignal {
        if rows.get(i).is_some_and(|r| r.rsi > self.params.sell_threshold) {
            ExitSignal::NextOpen
        } else {
            ExitSignal::Hold
        }
    }
}
