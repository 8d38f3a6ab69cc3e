//! CSV report writer.
//!
//! Per ticker, under the output directory:
//! - `<TICKER>_trades.csv`: trade table in canonical column order
//! - `<TICKER>_summary.csv`: `key,value` rows
//!
//! The feature table goes to a caller-chosen path. Its `ribbon_segment`
//! column numbers the same-colour ribbon runs from 0; uncoloured bars leave it empty.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::GoldhandError;
use crate::domain::extrema::ExtremaKind;
use crate::domain::features::FeatureRow;
use crate::domain::strategy::goldhand_line::{color_segments, ribbon_colors, RibbonColor};
use crate::ports::report_port::ReportPort;

pub const TRADE_COLUMNS: [&str; 9] = [
    "ticker",
    "buy_price",
    "buy_date",
    "trade_id",
    "status",
    "sell_price",
    "sell_date",
    "result",
    "days_in_trade",
];

pub const FEATURE_COLUMNS: [&str; 34] = [
    "date",
    "ticker",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "hl2",
    "rsi",
    "sma_50",
    "sma_100",
    "sma_200",
    "diff_sma50",
    "diff_sma100",
    "diff_sma200",
    "bb_mid",
    "bb_upper",
    "bb_lower",
    "diff_upper_bb",
    "diff_lower_bb",
    "v1",
    "v2",
    "v3",
    "v4",
    "ribbon_color",
    "ribbon_segment",
    "ema_fast",
    "ema_slow",
    "adx",
    "plus_di",
    "minus_di",
    "local",
    "local_text",
    "row",
];

#[derive(Serialize)]
struct FeatureRecord<'a> {
    date: NaiveDate,
    ticker: &'a str,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    hl2: f64,
    rsi: f64,
    sma_50: f64,
    sma_100: f64,
    sma_200: f64,
    diff_sma50: f64,
    diff_sma100: f64,
    diff_sma200: f64,
    bb_mid: f64,
    bb_upper: f64,
    bb_lower: f64,
    diff_upper_bb: f64,
    diff_lower_bb: f64,
    v1: f64,
    v2: f64,
    v3: f64,
    v4: f64,
    ribbon_color: Option<RibbonColor>,
    ribbon_segment: Option<usize>,
    ema_fast: f64,
    ema_slow: f64,
    adx: f64,
    plus_di: f64,
    minus_di: f64,
    local: Option<ExtremaKind>,
    local_text: &'a str,
    row: usize,
}

impl<'a> FeatureRecord<'a> {
    fn new(row: usize, f: &'a FeatureRow, ribbon_segment: Option<usize>) -> Self {
        Self {
            date: f.bar.date,
            ticker: &f.bar.ticker,
            open: f.bar.open,
            high: f.bar.high,
            low: f.bar.low,
            close: f.bar.close,
            volume: f.bar.volume,
            hl2: f.hl2,
            rsi: f.rsi,
            sma_50: f.sma_50,
            sma_100: f.sma_100,
            sma_200: f.sma_200,
            diff_sma50: f.diff_sma50,
            diff_sma100: f.diff_sma100,
            diff_sma200: f.diff_sma200,
            bb_mid: f.bb_mid,
            bb_upper: f.bb_upper,
            bb_lower: f.bb_lower,
            diff_upper_bb: f.diff_upper_bb,
            diff_lower_bb: f.diff_lower_bb,
            v1: f.v1,
            v2: f.v2,
            v3: f.v3,
            v4: f.v4,
            ribbon_color: f.ribbon_color,
            ribbon_segment,
            ema_fast: f.ema_fast,
            ema_slow: f.ema_slow,
            adx: f.adx,
            plus_di: f.plus_di,
            minus_di: f.minus_di,
            local: f.local,
            local_text: &f.local_text,
            row,
        }
    }
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn writer(path: &Path) -> Result<csv::Writer<fs::File>, GoldhandError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new().has_headers(false).from_path(path)?)
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_dir: &str) -> Result<(), GoldhandError> {
        let dir = Path::new(output_dir);

        let trades_path = dir.join(format!("{}_trades.csv", result.ticker));
        let mut wtr = writer(&trades_path)?;
        wtr.write_record(TRADE_COLUMNS)?;
        for trade in &result.trades {
            wtr.serialize(trade)?;
        }
        wtr.flush()?;

        let summary_path = dir.join(format!("{}_summary.csv", result.ticker));
        let mut wtr = writer(&summary_path)?;
        wtr.write_record(["key", "value"])?;
        for (key, value) in result.summary.to_pairs() {
            wtr.write_record([key, value])?;
        }
        wtr.flush()?;

        info!(
            "Wrote {} and {}",
            trades_path.display(),
            summary_path.display()
        );
        Ok(())
    }

    fn write_features(&self, rows: &[FeatureRow], output_path: &str) -> Result<(), GoldhandError> {
        let path = Path::new(output_path);
        let mut wtr = writer(path)?;
        wtr.write_record(FEATURE_COLUMNS)?;
        let mut segment_of = vec![None; rows.len()];
        for (n, seg) in color_segments(&ribbon_colors(rows)).iter().enumerate() {
            segment_of[seg.start..=seg.end].fill(Some(n));
        }
        for (i, row) in rows.iter().enumerate() {
            wtr.serialize(FeatureRecord::new(i, row, segment_of[i]))?;
        }
        wtr.flush()?;
        info!("Wrote {} feature rows to {}", rows.len(), path.display());
        Ok(())
    }
}
