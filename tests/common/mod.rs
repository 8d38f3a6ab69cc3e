#![allow(dead_code)]

use chrono::NaiveDate;
use goldhand::domain::error::GoldhandError;
use goldhand::domain::features::FeatureRow;
pub use goldhand::domain::ohlcv::OhlcvBar;
use goldhand::domain::strategy::{ExitSignal, SignalStrategy};
use goldhand::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, GoldhandError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(GoldhandError::DataRead {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, GoldhandError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars starting 2024-01-01 with `open` one below close.
pub fn bars_from_closes(ticker: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            ticker: ticker.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        })
        .collect()
}

/// Rising-then-falling wave, enough bars for every feature column.
pub fn generate_bars(ticker: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price + (i as f64 * 0.15).sin() * start_price * 0.2 + i as f64 * 0.05)
        .collect();
    bars_from_closes(ticker, &closes)
}

pub fn write_bars_csv(path: &std::path::Path, bars: &[OhlcvBar]) {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(path, out).unwrap();
}

/// Strategy driven by fixed per-bar states; `true` means "in the buy state".
/// Enters on a false→true transition, exits on true→false.
pub struct ScriptedStrategy {
    pub states: Vec<bool>,
}

impl ScriptedStrategy {
    pub fn new(states: Vec<bool>) -> Self {
        Self { states }
    }

    fn flipped(&self, i: usize, to: bool) -> bool {
        i > 0 && self.states[i] == to && self.states[i - 1] != to
    }
}

impl SignalStrategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn parameters(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn prepare(&mut self, rows: &[FeatureRow]) {
        self.states.resize(rows.len(), false);
    }

    fn should_enter(&self, _rows: &[FeatureRow], i: usize) -> bool {
        self.flipped(i, true)
    }

    fn should_exit(&mut self, _rows: &[FeatureRow], i: usize, _entry_price: f64) -> ExitSignal {
        if self.flipped(i, false) {
            ExitSignal::NextOpen
        } else {
            ExitSignal::Hold
        }
    }
}
