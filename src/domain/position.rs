//! Open positions and completed trade records.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// The long position currently held by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub trade_id: u32,
    pub buy_price: f64,
    pub buy_date: NaiveDate,
}

impl OpenPosition {
    /// Close the position. `status` is `Closed` for a signal exit and stays
    /// `Open` for the end-of-series mark.
    pub fn close(self, ticker: &str, sell_price: f64, sell_date: NaiveDate, status: TradeStatus) -> Trade {
        Trade {
            ticker: ticker.to_string(),
            buy_price: self.buy_price,
            buy_date: self.buy_date,
            trade_id: self.trade_id,
            status,
            sell_price,
            sell_date,
            result: sell_price / self.buy_price,
            days_in_trade: (sell_date - self.buy_date).num_days(),
        }
    }
}

/// One round trip. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub ticker: String,
    pub buy_price: f64,
    pub buy_date: NaiveDate,
    pub trade_id: u32,
    pub status: TradeStatus,
    pub sell_price: f64,
    pub sell_date: NaiveDate,
    /// `sell_price / buy_price`; infinite when the buy price is zero.
    pub result: f64,
    /// Calendar days between buy and sell.
    pub days_in_trade: i64,
}

impl Trade {
    /// Result as a percentage: `(result - 1) * 100`.
    pub fn result_pct(&self) -> f64 {
        (self.result - 1.0) * 100.0
    }

    pub fn is_win(&self) -> bool {
        self.result > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn open_position() -> OpenPosition {
        OpenPosition {
            trade_id: 3,
            buy_price: 50.0,
            buy_date: date(1),
        }
    }

    #[test]
    fn close_computes_result_and_days() {
        let trade = open_position().close("BHP", 60.0, date(11), TradeStatus::Closed);
        assert_eq!(trade.ticker, "BHP");
        assert_eq!(trade.trade_id, 3);
        assert!((trade.result - 1.2).abs() < f64::EPSILON);
        assert_eq!(trade.days_in_trade, 10);
        assert!(trade.is_win());
        assert!((trade.result_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn end_of_series_mark_keeps_open_status() {
        let trade = open_position().close("BHP", 40.0, date(2), TradeStatus::Open);
        assert_eq!(trade.status, TradeStatus::Open);
        assert!(!trade.is_win());
        assert_eq!(trade.days_in_trade, 1);
    }

    #[test]
    fn zero_buy_price_gives_infinite_result() {
        let position = OpenPosition {
            buy_price: 0.0,
            ..open_position()
        };
        let trade = position.close("X", 10.0, date(5), TradeStatus::Closed);
        assert!(trade.result.is_infinite());
    }

    #[test]
    fn break_even_is_not_a_win() {
        let trade = open_position().close("BHP", 50.0, date(4), TradeStatus::Closed);
        assert!(!trade.is_win());
    }
}
