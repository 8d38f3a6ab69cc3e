//! Trade state machine.
//!
//! Walks the feature table once, bar by bar, holding at most one long
//! position. Signals on bar i fill at bar i+1's open (bar i's close on the
//! last bar); stop exits fill on bar i at the stop price clamped to the bar's
//! low. A position still open after the last bar is marked at the last close
//! and keeps status `Open`.

use chrono::NaiveDate;
use log::{debug, warn};

use super::features::FeatureRow;
use super::position::{OpenPosition, Trade, TradeStatus};
use super::strategy::{ExitSignal, SignalStrategy};

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub price: f64,
    pub date: NaiveDate,
}

/// Next-bar execution: open of bar i+1, or close of bar i when i is the last bar.
pub fn next_bar_fill(rows: &[FeatureRow], i: usize) -> Fill {
    match rows.get(i + 1) {
        Some(next) => Fill {
            price: next.bar.open,
            date: next.bar.date,
        },
        None => Fill {
            price: rows[i].bar.close,
            date: rows[i].bar.date,
        },
    }
}

/// Stop execution on bar i: the stop price, never below the bar's low.
pub fn stop_fill(rows: &[FeatureRow], i: usize, stop: f64) -> Fill {
    let bar = &rows[i].bar;
    Fill {
        price: stop.max(bar.low),
        date: bar.date,
    }
}

#[derive(Debug)]
pub struct TradeStateMachine {
    ticker: String,
    position: Option<OpenPosition>,
    next_trade_id: u32,
    last_exit_bar: Option<usize>,
    trades: Vec<Trade>,
}

impl TradeStateMachine {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            position: None,
            next_trade_id: 1,
            last_exit_bar: None,
            trades: Vec::new(),
        }
    }

    /// Run the whole series and return every trade in order.
    pub fn run(mut self, rows: &[FeatureRow], strategy: &mut dyn SignalStrategy) -> Vec<Trade> {
        strategy.prepare(rows);
        let cooldown = strategy.cooldown_bars();

        for i in strategy.warmup()..rows.len() {
            if !rows[i].bar.is_complete() {
                debug!("{}: bar {} has undefined high/low/close, no signal", self.ticker, rows[i].bar.date);
                continue;
            }

            if let Some(entry_price) = self.position.as_ref().map(|p| p.buy_price) {
                let fill = match strategy.should_exit(rows, i, entry_price) {
                    ExitSignal::Hold => continue,
                    ExitSignal::NextOpen => next_bar_fill(rows, i),
                    ExitSignal::Stop(stop) => stop_fill(rows, i, stop),
                };
                self.exit(fill, i);
            } else if self.cooldown_elapsed(i, cooldown) && strategy.should_enter(rows, i) {
                let fill = next_bar_fill(rows, i);
                if self.enter(fill.clone()) {
                    strategy.on_entry(fill.price);
                }
            }
        }

        self.finish(rows)
    }

    fn cooldown_elapsed(&self, i: usize, cooldown: usize) -> bool {
        self.last_exit_bar.is_none_or(|exit| i - exit >= cooldown)
    }

    fn enter(&mut self, fill: Fill) -> bool {
        if !fill.price.is_finite() {
            warn!("{}: skipping entry on {}, fill price is {}", self.ticker, fill.date, fill.price);
            return false;
        }
        debug!(
            "{}: trade {} buy at {} on {}",
            self.ticker, self.next_trade_id, fill.price, fill.date
        );
        self.position = Some(OpenPosition {
            trade_id: self.next_trade_id,
            buy_price: fill.price,
            buy_date: fill.date,
        });
        true
    }

    fn exit(&mut self, fill: Fill, bar: usize) {
        if !fill.price.is_finite() {
            warn!("{}: skipping exit on {}, fill price is {}", self.ticker, fill.date, fill.price);
            return;
        }
        let Some(position) = self.position.take() else {
            return;
        };
        let trade = position.close(&self.ticker, fill.price, fill.date, TradeStatus::Closed);
        debug!(
            "{}: trade {} sell at {} on {} (result {:.4})",
            self.ticker, trade.trade_id, trade.sell_price, trade.sell_date, trade.result
        );
        self.record(trade);
        self.next_trade_id += 1;
        self.last_exit_bar = Some(bar);
    }

    fn finish(mut self, rows: &[FeatureRow]) -> Vec<Trade> {
        if let (Some(position), Some(last)) = (self.position.take(), rows.last()) {
            debug!(
                "{}: trade {} still open, marking at last close {}",
                self.ticker, position.trade_id, last.bar.close
            );
            let trade = position.close(&self.ticker, last.bar.close, last.bar.date, TradeStatus::Open);
            self.record(trade);
        }
        self.trades
    }

    fn record(&mut self, trade: Trade) {
        if !trade.result.is_finite() {
            warn!(
                "{}: trade {} has non-finite result (buy {}, sell {})",
                self.ticker, trade.trade_id, trade.buy_price, trade.sell_price
            );
        }
        self.trades.push(trade);
    }
}
