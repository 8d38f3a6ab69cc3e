//! Feature table: one [`FeatureRow`] per bar with the derived columns used by
//! strategies, the summary and the chart export.
//!
//! Undefined values (warmup rows, NaN inputs) are `f64::NAN`; the table always
//! has exactly one row per input bar.

use super::extrema::{self, ExtremaKind};
use super::indicator::{
    self, calculate_adx, calculate_bollinger, calculate_ema, calculate_rsi, calculate_sma, calculate_smma, pct_distance,
};
use super::ohlcv::{column, OhlcvBar};
use super::strategy::goldhand_line::{ribbon_color, RibbonColor, RIBBON_WINDOWS};

pub const SMA_WINDOWS: [usize; 3] = [50, 100, 200];
pub const DEFAULT_EMA_FAST: usize = 20;
pub const DEFAULT_EMA_SLOW: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub rsi_window: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
    pub extrema_order: usize,
    pub extrema_trailing_window: usize,
    /// EMA spans for the `ema_fast` / `ema_slow` columns.
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub adx_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rsi_window: indicator::rsi::DEFAULT_WINDOW,
            bollinger_window: indicator::bollinger::DEFAULT_WINDOW,
            bollinger_k: indicator::bollinger::DEFAULT_K,
            extrema_order: extrema::DEFAULT_ORDER,
            extrema_trailing_window: extrema::DEFAULT_TRAILING_WINDOW,
            ema_fast: DEFAULT_EMA_FAST,
            ema_slow: DEFAULT_EMA_SLOW,
            adx_window: indicator::adx::DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub bar: OhlcvBar,
    pub hl2: f64,
    pub rsi: f64,
    pub sma_50: f64,
    pub sma_100: f64,
    pub sma_200: f64,
    /// `(close / sma_N - 1) * 100`
    pub diff_sma50: f64,
    pub diff_sma100: f64,
    pub diff_sma200: f64,
    pub bb_mid: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// `(bb_upper / close - 1) * 100`
    pub diff_upper_bb: f64,
    /// `(bb_lower / close - 1) * 100`
    pub diff_lower_bb: f64,
    /// Ribbon lines: SMMA of hl2 over windows 15, 19, 25 and 29.
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub v4: f64,
    /// `None` while any ribbon line is undefined.
    pub ribbon_color: Option<RibbonColor>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub local: Option<ExtremaKind>,
    /// Empty unless `local` is set.
    pub local_text: String,
}

pub fn build_features(bars: &[OhlcvBar], config: &FeatureConfig) -> Vec<FeatureRow> {
    let closes = column(bars, |b| b.close);

    let rsi = calculate_rsi(&closes, config.rsi_window);
    let [sma_50, sma_100, sma_200] = SMA_WINDOWS.map(|w| calculate_sma(&closes, w));
    let bands = calculate_bollinger(&closes, config.bollinger_window, config.bollinger_k);
    let hl2: Vec<f64> = bars.iter().map(OhlcvBar::hl2).collect();
    let [v1, v2, v3, v4] = RIBBON_WINDOWS.map(|w| calculate_smma(&hl2, w));
    let ema_fast = calculate_ema(&closes, config.ema_fast);
    let ema_slow = calculate_ema(&closes, config.ema_slow);
    let adx = calculate_adx(bars, config.adx_window);

    let mut rows: Vec<FeatureRow> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let close = bar.close;
            FeatureRow {
                bar: bar.clone(),
                hl2: hl2[i],
                rsi: rsi[i],
                sma_50: sma_50[i],
                sma_100: sma_100[i],
                sma_200: sma_200[i],
                diff_sma50: pct_distance(close, sma_50[i]),
                diff_sma100: pct_distance(close, sma_100[i]),
                diff_sma200: pct_distance(close, sma_200[i]),
                bb_mid: bands.middle[i],
                bb_upper: bands.upper[i],
                bb_lower: bands.lower[i],
                diff_upper_bb: pct_distance(bands.upper[i], close),
                diff_lower_bb: pct_distance(bands.lower[i], close),
                v1: v1[i],
                v2: v2[i],
                v3: v3[i],
                v4: v4[i],
                ribbon_color: ribbon_color([v1[i], v2[i], v3[i], v4[i]]),
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                adx: adx.adx[i],
                plus_di: adx.plus_di[i],
                minus_di: adx.minus_di[i],
                local: None,
                local_text: String::new(),
            }
        })
        .collect();

    for point in extrema::detect_extrema(bars, config.extrema_order, config.extrema_trailing_window) {
        let row = &mut rows[point.index];
        row.local = Some(point.kind);
        row.local_text = point.annotation.to_string();
    }

    rows
}

/// Feature rows over synthetic bars (`open = close`, `high/low = close ± 1`,
/// one bar per calendar day from 2024-01-01).
#[cfg(test)]
pub(crate) fn test_rows(closes: &[f64]) -> Vec<FeatureRow> {
    use chrono::NaiveDate;

    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars: Vec<OhlcvBar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| OhlcvBar {
            ticker: "TEST".into(),
            date: base + chrono::Duration::days(i as i64),
            open: c,
            high: c + 1.0,
            low: c - 1.0,
            close: c,
            volume: 100,
        })
        .collect();
    build_features(&bars, &FeatureConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvBar {
                ticker: "TEST".into(),
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 100,
            })
            .collect()
    }

    #[test]
    fn one_row_per_bar() {
        let bars = make_bars(&[10.0; 25]);
        let rows = build_features(&bars, &FeatureConfig::default());
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[3].bar, bars[3]);
    }

    #[test]
    fn empty_input() {
        assert!(build_features(&[], &FeatureConfig::default()).is_empty());
    }

    #[test]
    fn short_history_leaves_nan_columns() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let rows = build_features(&bars, &FeatureConfig::default());
        assert!(rows.iter().all(|r| r.rsi.is_nan()));
        assert!(rows.iter().all(|r| r.sma_50.is_nan() && r.diff_sma50.is_nan()));
        assert!(rows.iter().all(|r| r.bb_upper.is_nan()));
        assert!((rows[1].hl2 - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_columns() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let rows = build_features(&make_bars(&closes), &FeatureConfig::default());
        let last = &rows[59];
        // sma_50 of 110..=159 is 134.5
        assert!((last.sma_50 - 134.5).abs() < 1e-9);
        assert!((last.diff_sma50 - (159.0 / 134.5 - 1.0) * 100.0).abs() < 1e-9);
        assert!(last.diff_upper_bb > 0.0);
        assert!(last.diff_lower_bb < 0.0);
    }

    #[test]
    fn ribbon_trend_and_adx_columns() {
        let mut closes = vec![100.0; 20];
        closes.extend((0..60).map(|i| 200.0 + i as f64));
        let rows = build_features(&make_bars(&closes), &FeatureConfig::default());

        assert_eq!(rows[19].ribbon_color, Some(RibbonColor::Grey));
        assert_eq!(rows[20].ribbon_color, Some(RibbonColor::Gold));
        let r = &rows[20];
        assert!(r.v4 < r.v3 && r.v3 < r.v2 && r.v2 < r.v1);
        // smma seeds on the first hl2, so the lines are defined from bar 0
        assert!((rows[0].v1 - 100.0).abs() < f64::EPSILON);

        assert!((rows[0].ema_fast - 100.0).abs() < f64::EPSILON);
        assert!(rows[40].ema_fast > rows[40].ema_slow);
        assert!(rows[5].adx.is_nan());
        assert!(rows[79].adx.is_finite());
        // steady +1 ramp: +DM 1, -DM 0, TR 2
        assert!((rows[79].plus_di - 50.0).abs() < 1e-9);
        assert_eq!(rows[79].minus_di, 0.0);
    }

    #[test]
    fn ema_spans_follow_config() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let config = FeatureConfig {
            ema_fast: 3,
            ema_slow: 9,
            ..FeatureConfig::default()
        };
        let rows = build_features(&bars, &config);
        let expected = calculate_ema(&closes, 3);
        assert_eq!(rows[29].ema_fast, expected[29]);
        assert_eq!(rows[29].ema_slow, calculate_ema(&closes, 9)[29]);
    }

    #[test]
    fn extrema_columns_are_filled() {
        let mut closes = Vec::new();
        for _ in 0..3 {
            closes.extend((0..10).map(|i| 100.0 + i as f64 * 2.0));
            closes.extend((0..10).map(|i| 120.0 - i as f64 * 2.0));
        }
        let config = FeatureConfig {
            extrema_order: 3,
            ..FeatureConfig::default()
        };
        let rows = build_features(&make_bars(&closes), &config);

        let marked: Vec<&FeatureRow> = rows.iter().filter(|r| r.local.is_some()).collect();
        assert!(!marked.is_empty());
        assert!(marked.iter().all(|r| !r.local_text.is_empty()));
        assert!(marked[0].local_text.starts_with('$'));
        assert!(rows.iter().filter(|r| r.local.is_none()).all(|r| r.local_text.is_empty()));
    }
}
