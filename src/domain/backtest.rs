//! Single-symbol backtest pipeline: features → signals → trades → summary.

use super::execution::TradeStateMachine;
use super::features::{build_features, FeatureConfig, FeatureRow};
use super::metrics::{summarize, Summary};
use super::ohlcv::OhlcvBar;
use super::position::Trade;
use super::strategy::StrategyConfig;

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub ticker: String,
    pub trades: Vec<Trade>,
    pub summary: Summary,
    pub features: Vec<FeatureRow>,
}

/// Run one strategy over one symbol's bars. Never fails: an empty or short
/// series yields no trades and a zero-valued summary.
pub fn run_backtest(
    ticker: &str,
    bars: &[OhlcvBar],
    strategy_config: &StrategyConfig,
    feature_config: &FeatureConfig,
) -> BacktestResult {
    let features = build_features(bars, &strategy_config.feature_config(feature_config));
    let mut strategy = strategy_config.build();
    let parameters = strategy.parameters();

    let trades = TradeStateMachine::new(ticker).run(&features, strategy.as_mut());
    let summary = summarize(ticker, &trades, bars, parameters);

    BacktestResult {
        ticker: ticker.to_string(),
        trades,
        summary,
        features,
    }
}
