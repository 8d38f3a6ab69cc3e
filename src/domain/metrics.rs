//! Performance summary of a finished backtest.
//!
//! Percentages are `(ratio - 1) * 100` rounded to 2 decimals. Statistics over
//! an empty set (no trades, no winners, no losers) are `0.0`; the compounded
//! result of zero trades is the empty product `1.0`.

use std::fmt;

use chrono::NaiveDate;

use super::ohlcv::OhlcvBar;
use super::position::Trade;
use super::round2;

pub const LISTING_SEPARATOR: &str = " # ";

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub ticker: String,
    pub number_of_trades: usize,
    /// Share of trades with result > 1.
    pub win_ratio_pct: f64,
    pub average_res_pct: f64,
    /// Rounded to whole days.
    pub average_trade_len_days: f64,
    pub median_res_pct: f64,
    pub median_trade_len_days: f64,
    /// Product of every trade result.
    pub cumulative_result: f64,
    pub trade_results: Vec<f64>,
    /// Trades with result >= 1.
    pub profitable_trade_results: Vec<f64>,
    pub profitable_trades_mean: f64,
    pub profitable_trades_median: f64,
    /// Trades with result < 1.
    pub looser_trade_results: Vec<f64>,
    pub looser_trades_mean: f64,
    pub looser_trades_median: f64,
    pub number_of_win_trades: usize,
    pub number_of_lost_trades: usize,
    pub max_gain_pct: f64,
    pub max_lost_pct: f64,
    pub first_trade_buy: Option<NaiveDate>,
    pub first_data_date: Option<NaiveDate>,
    pub first_open_price: Option<f64>,
    pub last_data_date: Option<NaiveDate>,
    pub last_close_price: Option<f64>,
    /// Buy-and-hold multiple: last close / first open, rounded to 2 decimals.
    pub hold_result: f64,
    pub parameters: Vec<(String, String)>,
}

fn result_pct(ratio: f64) -> f64 {
    round2((ratio - 1.0) * 100.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentage of the mean/median ratio, or 0 for an empty subset.
fn subset_pct(ratios: &[f64], stat: fn(&[f64]) -> f64) -> f64 {
    if ratios.is_empty() {
        0.0
    } else {
        result_pct(stat(ratios))
    }
}

pub fn summarize(ticker: &str, trades: &[Trade], bars: &[OhlcvBar], parameters: Vec<(String, String)>) -> Summary {
    let results: Vec<f64> = trades.iter().map(|t| t.result).collect();
    let days: Vec<f64> = trades.iter().map(|t| t.days_in_trade as f64).collect();
    let profitable: Vec<f64> = results.iter().copied().filter(|&r| r >= 1.0).collect();
    let looser: Vec<f64> = results.iter().copied().filter(|&r| r < 1.0).collect();

    let number_of_trades = trades.len();
    let number_of_win_trades = trades.iter().filter(|t| t.is_win()).count();
    let win_ratio_pct = if number_of_trades == 0 {
        0.0
    } else {
        round2(number_of_win_trades as f64 / number_of_trades as f64 * 100.0)
    };

    let max_gain_pct = results.iter().copied().reduce(f64::max).map_or(0.0, result_pct);
    let max_lost_pct = results.iter().copied().reduce(f64::min).map_or(0.0, result_pct);

    let first_open_price = bars.first().map(|b| b.open);
    let last_close_price = bars.last().map(|b| b.close);
    let hold_result = match (first_open_price, last_close_price) {
        (Some(open), Some(close)) if open != 0.0 => round2(close / open),
        _ => 0.0,
    };

    Summary {
        ticker: ticker.to_string(),
        number_of_trades,
        win_ratio_pct,
        average_res_pct: subset_pct(&results, mean),
        average_trade_len_days: mean(&days).round(),
        median_res_pct: subset_pct(&results, median),
        median_trade_len_days: median(&days),
        cumulative_result: results.iter().product(),
        trade_results: results.iter().map(|&r| result_pct(r)).collect(),
        profitable_trades_mean: subset_pct(&profitable, mean),
        profitable_trades_median: subset_pct(&profitable, median),
        profitable_trade_results: profitable.iter().map(|&r| result_pct(r)).collect(),
        looser_trades_mean: subset_pct(&looser, mean),
        looser_trades_median: subset_pct(&looser, median),
        looser_trade_results: looser.iter().map(|&r| result_pct(r)).collect(),
        number_of_win_trades,
        number_of_lost_trades: number_of_trades - number_of_win_trades,
        max_gain_pct,
        max_lost_pct,
        first_trade_buy: trades.iter().map(|t| t.buy_date).min(),
        first_data_date: bars.first().map(|b| b.date),
        first_open_price,
        last_data_date: bars.last().map(|b| b.date),
        last_close_price,
        hold_result,
        parameters,
    }
}

fn join_listing(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(LISTING_SEPARATOR)
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Summary {
    /// Named statistics in report order, followed by the strategy parameters.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![
            ("ticker", self.ticker.clone()),
            ("number_of_trades", self.number_of_trades.to_string()),
            ("win_ratio(%)", self.win_ratio_pct.to_string()),
            ("average_res(%)", self.average_res_pct.to_string()),
            ("average_trade_len(days)", self.average_trade_len_days.to_string()),
            ("median_res(%)", self.median_res_pct.to_string()),
            ("cumulative_result", self.cumulative_result.to_string()),
            ("trade_results", join_listing(&self.trade_results)),
            ("profitable_trade_results", join_listing(&self.profitable_trade_results)),
            ("profitable_trades_mean", self.profitable_trades_mean.to_string()),
            ("profitable_trades_median", self.profitable_trades_median.to_string()),
            ("looser_trade_results", join_listing(&self.looser_trade_results)),
            ("looser_trades_mean", self.looser_trades_mean.to_string()),
            ("looser_trades_median", self.looser_trades_median.to_string()),
            ("median_trade_len(days)", self.median_trade_len_days.to_string()),
            ("number_of_win_trades", self.number_of_win_trades.to_string()),
            ("number_of_lost_trades", self.number_of_lost_trades.to_string()),
            ("max_gain(%)", self.max_gain_pct.to_string()),
            ("max_lost(%)", self.max_lost_pct.to_string()),
            ("first_trade_buy", opt_to_string(self.first_trade_buy)),
            ("first_data_date", opt_to_string(self.first_data_date)),
            ("first_open_price", opt_to_string(self.first_open_price)),
            ("last_data_date", opt_to_string(self.last_data_date)),
            ("last_close_price", opt_to_string(self.last_close_price)),
            ("hold_result", format!("{} x", self.hold_result)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        pairs.extend(self.parameters.iter().cloned());
        pairs
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.to_pairs();
        let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in pairs {
            writeln!(f, "{:<width$}  {}", key, value, width = width)?;
        }
        Ok(())
    }
}
