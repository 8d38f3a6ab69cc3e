//! Signal strategies.
//!
//! A strategy turns the feature table into per-bar entry and exit decisions.
//! The [`TradeStateMachine`](crate::domain::execution::TradeStateMachine)
//! owns the position and fills; strategies only answer "enter here?" and
//! "exit here, and how?".

pub mod adaptive_trend;
pub mod goldhand_line;
pub mod rsi_threshold;

use std::fmt;

use super::features::{FeatureConfig, FeatureRow};

pub use adaptive_trend::{AdaptiveTrend, AdaptiveTrendParams, TrendPreset};
pub use goldhand_line::{GoldhandLine, GoldhandLineParams, RibbonColor};
pub use rsi_threshold::{RsiThreshold, RsiThresholdParams};

/// Outcome of an exit check while a position is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitSignal {
    Hold,
    /// Exit at the next bar's open (or this bar's close on the last bar).
    NextOpen,
    /// Exit on this bar at the given stop price, never below the bar's low.
    Stop(f64),
}

pub trait SignalStrategy {
    fn name(&self) -> &'static str;

    /// Parameter name/value pairs echoed into the summary.
    fn parameters(&self) -> Vec<(String, String)>;

    /// Index of the first bar the state machine evaluates.
    fn warmup(&self) -> usize {
        1
    }

    /// Bars that must pass after an exit before the next entry.
    fn cooldown_bars(&self) -> usize {
        0
    }

    /// Compute strategy-local series from the feature table. Called once
    /// before the bar loop.
    fn prepare(&mut self, rows: &[FeatureRow]);

    fn should_enter(&self, rows: &[FeatureRow], i: usize) -> bool;

    /// Called after an entry fill.
    fn on_entry(&mut self, _fill_price: f64) {}

    fn should_exit(&mut self, rows: &[FeatureRow], i: usize, entry_price: f64) -> ExitSignal;
}

/// Strategy selection plus parameters, as read from configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    GoldhandLine(GoldhandLineParams),
    Rsi(RsiThresholdParams),
    AdaptiveTrend(AdaptiveTrendParams),
}

impl StrategyConfig {
    pub fn build(&self) -> Box<dyn SignalStrategy + Send> {
        match self {
            StrategyConfig::GoldhandLine(p) => Box::new(GoldhandLine::new(p.clone())),
            StrategyConfig::Rsi(p) => Box::new(RsiThreshold::new(p.clone())),
            StrategyConfig::AdaptiveTrend(p) => Box::new(AdaptiveTrend::new(p.clone())),
        }
    }

    /// Feature settings for running this strategy: `base` with any columns
    /// the strategy depends on set to its own parameters.
    pub fn feature_config(&self, base: &FeatureConfig) -> FeatureConfig {
        match self {
            StrategyConfig::AdaptiveTrend(p) => FeatureConfig {
                ema_fast: p.ema_fast,
                ema_slow: p.ema_slow,
                ..base.clone()
            },
            _ => base.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StrategyConfig::GoldhandLine(_) => "goldhand_line",
            StrategyConfig::Rsi(_) => "rsi",
            StrategyConfig::AdaptiveTrend(_) => "adaptive_trend",
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::GoldhandLine(GoldhandLineParams::default())
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}
