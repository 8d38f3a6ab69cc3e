//! CSV bar source: one `<TICKER>.csv` per ticker under a base directory.
//!
//! Columns are located by header name (case-insensitive): `date, open, high,
//! low, close, volume` are required, `ticker` is optional. Empty price fields
//! load as NaN. Dates must be strictly ascending.

use crate::domain::error::GoldhandError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, GoldhandError> {
        let path = self.csv_path(ticker);
        let file = File::open(&path).map_err(|e| GoldhandError::DataRead {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        parse_bars(file, ticker)
    }

    fn list_tickers(&self) -> Result<Vec<String>, GoldhandError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| GoldhandError::DataRead {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

/// Parse a bar table. Rows are numbered from 1 (first data row) in errors.
pub fn parse_bars<R: Read>(reader: R, ticker: &str) -> Result<Vec<OhlcvBar>, GoldhandError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_ascii_lowercase()).collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let mut columns = [0usize; 6];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = position(name).ok_or_else(|| GoldhandError::MissingColumn {
            column: name.to_string(),
        })?;
    }
    let [date_col, open_col, high_col, low_col, close_col, volume_col] = columns;
    let ticker_col = position("ticker");

    let mut bars: Vec<OhlcvBar> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let date = parse_date(field(date_col)).ok_or_else(|| GoldhandError::MalformedBar {
            row,
            reason: format!("invalid date '{}'", field(date_col)),
        })?;

        if let Some(prev) = bars.last() {
            if date == prev.date {
                return Err(GoldhandError::MalformedBar {
                    row,
                    reason: format!("duplicate date {}", date),
                });
            }
            if date < prev.date {
                return Err(GoldhandError::MalformedBar {
                    row,
                    reason: format!("date {} is before {}", date, prev.date),
                });
            }
        }

        let price = |col: usize, name: &str| parse_price(field(col), name, row);
        bars.push(OhlcvBar {
            ticker: ticker_col
                .map(field)
                .filter(|t| !t.is_empty())
                .unwrap_or(ticker)
                .to_string(),
            date,
            open: price(open_col, "open")?,
            high: price(high_col, "high")?,
            low: price(low_col, "low")?,
            close: price(close_col, "close")?,
            volume: parse_volume(field(volume_col), row)?,
        });
    }

    Ok(bars)
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| value.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn parse_price(value: &str, name: &str, row: usize) -> Result<f64, GoldhandError> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse().map_err(|_| GoldhandError::MalformedBar {
        row,
        reason: format!("invalid {} value '{}'", name, value),
    })
}

fn parse_volume(value: &str, row: usize) -> Result<i64, GoldhandError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .or_else(|_| value.parse::<f64>().map(|v| v as i64))
        .map_err(|_| GoldhandError::MalformedBar {
            row,
            reason: format!("invalid volume value '{}'", value),
        })
}
