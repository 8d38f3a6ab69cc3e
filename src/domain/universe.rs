//! Ticker universe for batch backtesting.
//!
//! Parses ticker lists from configuration and loads each ticker's bars,
//! skipping tickers that cannot be read or have no data.

use std::collections::HashSet;

use log::{info, warn};

use crate::domain::batch::TickerJob;
use crate::domain::error::GoldhandError;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    ReadFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct LoadedUniverse {
    pub jobs: Vec<TickerJob>,
    pub skipped: Vec<SkippedTicker>,
}

/// Load bars for every ticker. Fails only when no ticker has data.
pub fn load_universe(data_port: &dyn DataPort, tickers: Vec<String>) -> Result<LoadedUniverse, GoldhandError> {
    let total = tickers.len();
    let mut jobs = Vec::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        let bars = match data_port.fetch_bars(&ticker) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("Skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::ReadFailed(e.to_string()),
                });
                continue;
            }
        };

        if bars.is_empty() {
            warn!("Skipping {} (no data found)", ticker);
            skipped.push(SkippedTicker {
                ticker,
                reason: SkipReason::NoData,
            });
            continue;
        }

        info!("  {}: {} bars [OK]", ticker, bars.len());
        jobs.push(TickerJob { ticker, bars });
    }

    if jobs.is_empty() {
        return Err(GoldhandError::NoData {
            ticker: "all".to_string(),
        });
    }

    if !skipped.is_empty() {
        info!("Backtesting {} of {} tickers", jobs.len(), total);
    }

    Ok(LoadedUniverse { jobs, skipped })
}
