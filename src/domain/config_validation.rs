//! Configuration loading and validation.
//!
//! Reads every section into typed settings and rejects out-of-range values
//! before any backtest runs. Absent keys take their defaults; present keys
//! that do not parse are errors rather than silently defaulted.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::batch::{default_workers, BatchConfig};
use crate::domain::error::GoldhandError;
use crate::domain::features::FeatureConfig;
use crate::domain::strategy::{
    AdaptiveTrendParams, GoldhandLineParams, RibbonColor, RsiThresholdParams, StrategyConfig, TrendPreset,
};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: String,
    pub tickers: Option<Vec<String>>,
    pub features: FeatureConfig,
    pub strategy: StrategyConfig,
    pub batch: BatchConfig,
    pub output_dir: String,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), GoldhandError> {
    load_run_config(config).map(|_| ())
}

pub fn load_run_config(config: &dyn ConfigPort) -> Result<RunConfig, GoldhandError> {
    let data_path = match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => return Err(missing("data", "path")),
    };

    let tickers = match config.get_string("data", "tickers") {
        Some(list) if !list.trim().is_empty() => {
            Some(parse_tickers(&list).map_err(|e| invalid("data", "tickers", e.to_string()))?)
        }
        _ => None,
    };

    let output_dir = config
        .get_string("output", "dir")
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    Ok(RunConfig {
        data_path,
        tickers,
        features: load_feature_config(config)?,
        strategy: load_strategy_config(config)?,
        batch: load_batch_config(config)?,
        output_dir,
    })
}

pub fn load_feature_config(config: &dyn ConfigPort) -> Result<FeatureConfig, GoldhandError> {
    let defaults = FeatureConfig::default();
    let features = FeatureConfig {
        rsi_window: read(config, "features", "rsi_window", defaults.rsi_window)?,
        bollinger_window: read(config, "features", "bollinger_window", defaults.bollinger_window)?,
        bollinger_k: read(config, "features", "bollinger_k", defaults.bollinger_k)?,
        extrema_order: read(config, "features", "extrema_order", defaults.extrema_order)?,
        extrema_trailing_window: read(
            config,
            "features",
            "extrema_trailing_window",
            defaults.extrema_trailing_window,
        )?,
        ema_fast: read(config, "features", "ema_fast", defaults.ema_fast)?,
        ema_slow: read(config, "features", "ema_slow", defaults.ema_slow)?,
        adx_window: read(config, "features", "adx_window", defaults.adx_window)?,
    };

    at_least("features", "rsi_window", features.rsi_window, 1)?;
    at_least("features", "bollinger_window", features.bollinger_window, 2)?;
    at_least("features", "extrema_order", features.extrema_order, 1)?;
    at_least("features", "extrema_trailing_window", features.extrema_trailing_window, 1)?;
    at_least("features", "ema_fast", features.ema_fast, 1)?;
    at_least("features", "ema_slow", features.ema_slow, 1)?;
    at_least("features", "adx_window", features.adx_window, 1)?;
    if features.ema_slow <= features.ema_fast {
        return Err(invalid("features", "ema_slow", "ema_slow must be greater than ema_fast"));
    }
    if !features.bollinger_k.is_finite() || features.bollinger_k < 0.0 {
        return Err(invalid("features", "bollinger_k", "bollinger_k must be non-negative"));
    }

    Ok(features)
}

pub fn load_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, GoldhandError> {
    let kind = config
        .get_string("strategy", "kind")
        .map(|k| k.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "goldhand_line".to_string());

    match kind.as_str() {
        "goldhand_line" => load_goldhand_line(config).map(StrategyConfig::GoldhandLine),
        "rsi" => load_rsi(config).map(StrategyConfig::Rsi),
        "adaptive_trend" => load_adaptive_trend(config).map(StrategyConfig::AdaptiveTrend),
        other => Err(invalid(
            "strategy",
            "kind",
            format!("unknown strategy '{}' (expected goldhand_line, rsi or adaptive_trend)", other),
        )),
    }
}

fn load_goldhand_line(config: &dyn ConfigPort) -> Result<GoldhandLineParams, GoldhandError> {
    let defaults = GoldhandLineParams::default();
    let params = GoldhandLineParams {
        buy_at: read::<RibbonColor>(config, "strategy", "buy_at", defaults.buy_at)?,
        sell_at: read::<RibbonColor>(config, "strategy", "sell_at", defaults.sell_at)?,
    };
    if params.buy_at == params.sell_at {
        return Err(invalid("strategy", "sell_at", "sell_at must differ from buy_at"));
    }
    Ok(params)
}

fn load_rsi(config: &dyn ConfigPort) -> Result<RsiThresholdParams, GoldhandError> {
    let defaults = RsiThresholdParams::default();
    let params = RsiThresholdParams {
        buy_threshold: read(config, "strategy", "buy_threshold", defaults.buy_threshold)?,
        sell_threshold: read(config, "strategy", "sell_threshold", defaults.sell_threshold)?,
    };
    in_percent_range("strategy", "buy_threshold", params.buy_threshold)?;
    in_percent_range("strategy", "sell_threshold", params.sell_threshold)?;
    if params.buy_threshold >= params.sell_threshold {
        return Err(invalid(
            "strategy",
            "buy_threshold",
            "buy_threshold must be below sell_threshold",
        ));
    }
    Ok(params)
}

fn load_adaptive_trend(config: &dyn ConfigPort) -> Result<AdaptiveTrendParams, GoldhandError> {
    let preset = read::<TrendPreset>(config, "strategy", "preset", TrendPreset::Stock)?;
    let base = AdaptiveTrendParams::for_preset(preset);
    let s = "strategy";

    let params = AdaptiveTrendParams {
        preset,
        ema_fast: read(config, s, "ema_fast", base.ema_fast)?,
        ema_slow: read(config, s, "ema_slow", base.ema_slow)?,
        rsi_min: read(config, s, "rsi_min", base.rsi_min)?,
        rsi_max: read(config, s, "rsi_max", base.rsi_max)?,
        adx_min: read(config, s, "adx_min", base.adx_min)?,
        di_min: read(config, s, "di_min", base.di_min)?,
        di_ratio: read(config, s, "di_ratio", base.di_ratio)?,
        initial_stop_pct: read(config, s, "initial_stop_pct", base.initial_stop_pct)?,
        trail_activate_pct: read(config, s, "trail_activate_pct", base.trail_activate_pct)?,
        trail_distance_pct: read(config, s, "trail_distance_pct", base.trail_distance_pct)?,
        cooldown_bars: read(config, s, "cooldown_bars", base.cooldown_bars)?,
    };

    at_least(s, "ema_fast", params.ema_fast, 1)?;
    if params.ema_slow <= params.ema_fast {
        return Err(invalid(s, "ema_slow", "ema_slow must be greater than ema_fast"));
    }
    in_percent_range(s, "rsi_min", params.rsi_min)?;
    in_percent_range(s, "rsi_max", params.rsi_max)?;
    if params.rsi_min >= params.rsi_max {
        return Err(invalid(s, "rsi_min", "rsi_min must be below rsi_max"));
    }
    in_percent_range(s, "adx_min", params.adx_min)?;
    in_percent_range(s, "di_min", params.di_min)?;
    if !(params.di_ratio > 0.0 && params.di_ratio.is_finite()) {
        return Err(invalid(s, "di_ratio", "di_ratio must be positive"));
    }
    in_fraction_range(s, "initial_stop_pct", params.initial_stop_pct)?;
    in_fraction_range(s, "trail_activate_pct", params.trail_activate_pct)?;
    in_fraction_range(s, "trail_distance_pct", params.trail_distance_pct)?;

    Ok(params)
}

pub fn load_batch_config(config: &dyn ConfigPort) -> Result<BatchConfig, GoldhandError> {
    let workers: usize = read(config, "batch", "workers", default_workers())?;
    at_least("batch", "workers", workers, 1)?;

    let timeout_secs: u64 = read(config, "batch", "timeout_secs", 0)?;
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    Ok(BatchConfig { workers, timeout })
}

/// Parse `[section] key` with `FromStr`, or return `default` when absent.
fn read<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, GoldhandError>
where
    T: FromStr,
    T::Err: ToString,
{
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(section, key, format!("cannot parse '{}': {}", raw.trim(), e.to_string()))),
    }
}

fn at_least(section: &str, key: &str, value: usize, min: usize) -> Result<(), GoldhandError> {
    if value < min {
        return Err(invalid(section, key, format!("{} must be at least {}", key, min)));
    }
    Ok(())
}

fn in_percent_range(section: &str, key: &str, value: f64) -> Result<(), GoldhandError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(section, key, format!("{} must be between 0 and 100", key)));
    }
    Ok(())
}

fn in_fraction_range(section: &str, key: &str, value: f64) -> Result<(), GoldhandError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(section, key, format!("{} must be in [0, 1)", key)));
    }
    Ok(())
}

fn missing(section: &str, key: &str) -> GoldhandError {
    GoldhandError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> GoldhandError {
    GoldhandError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: GoldhandError) -> String {
        match err {
            GoldhandError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {:?}", other),
        }
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let run = load_run_config(&make_config("[data]\npath = data\n")).unwrap();
        assert_eq!(run.data_path, "data");
        assert!(run.tickers.is_none());
        assert_eq!(run.features, FeatureConfig::default());
        assert_eq!(run.strategy, StrategyConfig::default());
        assert!(run.batch.timeout.is_none());
        assert!(run.batch.workers >= 1);
        assert_eq!(run.output_dir, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn full_config() {
        let config = make_config(
            r#"
[data]
path = ./bars
tickers = aapl, msft

[features]
rsi_window = 10
extrema_order = 15

[strategy]
kind = rsi
buy_threshold = 25
sell_threshold = 80

[batch]
workers = 3
timeout_secs = 60

[output]
dir = out
"#,
        );
        let run = load_run_config(&config).unwrap();
        assert_eq!(run.tickers, Some(vec!["AAPL".to_string(), "MSFT".to_string()]));
        assert_eq!(run.features.rsi_window, 10);
        assert_eq!(run.features.extrema_order, 15);
        assert_eq!(
            run.strategy,
            StrategyConfig::Rsi(RsiThresholdParams {
                buy_threshold: 25.0,
                sell_threshold: 80.0
            })
        );
        assert_eq!(run.batch.workers, 3);
        assert_eq!(run.batch.timeout, Some(Duration::from_secs(60)));
        assert_eq!(run.output_dir, "out");
    }

    #[test]
    fn missing_data_path_fails() {
        let err = validate_config(&make_config("[strategy]\nkind = rsi\n")).unwrap_err();
        assert!(matches!(err, GoldhandError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn duplicate_ticker_fails() {
        let err = validate_config(&make_config("[data]\npath = d\ntickers = A,B,a\n")).unwrap_err();
        assert_eq!(invalid_key(err), "tickers");
    }

    #[test]
    fn unknown_strategy_fails() {
        let err = load_strategy_config(&make_config("[strategy]\nkind = macd\n")).unwrap_err();
        assert_eq!(invalid_key(err), "kind");
    }

    #[test]
    fn unparseable_number_fails() {
        let err = load_feature_config(&make_config("[features]\nrsi_window = fourteen\n")).unwrap_err();
        assert_eq!(invalid_key(err), "rsi_window");
    }

    #[test]
    fn zero_windows_fail() {
        let err = load_feature_config(&make_config("[features]\nextrema_order = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "extrema_order");
        let err = load_feature_config(&make_config("[features]\nbollinger_window = 1\n")).unwrap_err();
        assert_eq!(invalid_key(err), "bollinger_window");
    }

    #[test]
    fn trend_column_spans() {
        let features = load_feature_config(&make_config(
            "[features]\nema_fast = 12\nema_slow = 26\nadx_window = 10\n",
        ))
        .unwrap();
        assert_eq!((features.ema_fast, features.ema_slow, features.adx_window), (12, 26, 10));
        let err = load_feature_config(&make_config("[features]\nadx_window = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "adx_window");
        let err = load_feature_config(&make_config("[features]\nema_fast = 30\nema_slow = 30\n")).unwrap_err();
        assert_eq!(invalid_key(err), "ema_slow");
    }

    #[test]
    fn rsi_thresholds_must_be_ordered() {
        let err = load_strategy_config(&make_config(
            "[strategy]\nkind = rsi\nbuy_threshold = 70\nsell_threshold = 30\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "buy_threshold");
    }

    #[test]
    fn rsi_threshold_out_of_range() {
        let err = load_strategy_config(&make_config("[strategy]\nkind = rsi\nsell_threshold = 120\n")).unwrap_err();
        assert_eq!(invalid_key(err), "sell_threshold");
    }

    #[test]
    fn ribbon_colours() {
        let strategy = load_strategy_config(&make_config("[strategy]\nbuy_at = blue\nsell_at = gold\n")).unwrap();
        assert_eq!(
            strategy,
            StrategyConfig::GoldhandLine(GoldhandLineParams {
                buy_at: RibbonColor::Blue,
                sell_at: RibbonColor::Gold
            })
        );

        let err = load_strategy_config(&make_config("[strategy]\nbuy_at = green\n")).unwrap_err();
        assert_eq!(invalid_key(err), "buy_at");

        let err = load_strategy_config(&make_config("[strategy]\nbuy_at = grey\n")).unwrap_err();
        assert_eq!(invalid_key(err), "sell_at");
    }

    #[test]
    fn adaptive_preset_with_override() {
        let strategy = load_strategy_config(&make_config(
            "[strategy]\nkind = adaptive_trend\npreset = crypto\ncooldown_bars = 2\n",
        ))
        .unwrap();
        let expected = AdaptiveTrendParams {
            cooldown_bars: 2,
            ..AdaptiveTrendParams::crypto()
        };
        assert_eq!(strategy, StrategyConfig::AdaptiveTrend(expected));
    }

    #[test]
    fn adaptive_invalid_values() {
        let err = load_strategy_config(&make_config(
            "[strategy]\nkind = adaptive_trend\nema_fast = 60\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "ema_slow");

        let err = load_strategy_config(&make_config(
            "[strategy]\nkind = adaptive_trend\ntrail_distance_pct = 1.5\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "trail_distance_pct");

        let err = load_strategy_config(&make_config("[strategy]\nkind = adaptive_trend\npreset = forex\n")).unwrap_err();
        assert_eq!(invalid_key(err), "preset");
    }

    #[test]
    fn batch_workers_must_be_positive() {
        let err = load_batch_config(&make_config("[batch]\nworkers = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "workers");
        let err = load_batch_config(&make_config("[batch]\ntimeout_secs = -1\n")).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
    }
}
