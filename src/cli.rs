//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::batch::{run_batch, TickerOutcome};
use crate::domain::config_validation::{load_run_config, RunConfig};
use crate::domain::error::GoldhandError;
use crate::domain::features::build_features;
use crate::domain::universe::{load_universe, parse_tickers};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "goldhand", about = "Indicator and signal backtester for OHLCV series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the configured strategy over one or more tickers
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated tickers, overriding [data] tickers
        #[arg(long)]
        ticker: Option<String>,
        /// Output directory, overriding [output] dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the feature table for one ticker
    Features {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List tickers available under [data] path
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            ticker,
            output,
        } => run_backtest(&config, ticker.as_deref(), output.as_deref()),
        Command::Features {
            config,
            ticker,
            output,
        } => run_features(&config, &ticker, output.as_deref()),
        Command::ListTickers { config } => run_list_tickers(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, GoldhandError> {
    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    load_run_config(&adapter)
}

/// Tickers from the command line, else from config, else every file in the data directory.
pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &RunConfig,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, GoldhandError> {
    if let Some(list) = ticker_override {
        return parse_tickers(list).map_err(|e| GoldhandError::ConfigInvalid {
            section: "cli".into(),
            key: "ticker".into(),
            reason: e.to_string(),
        });
    }
    match &config.tickers {
        Some(tickers) => Ok(tickers.clone()),
        None => data_port.list_tickers(),
    }
}

fn run_backtest(
    config_path: &Path,
    ticker_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<ExitCode, GoldhandError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(PathBuf::from(&config.data_path));

    let tickers = resolve_tickers(ticker_override, &config, &data_port)?;
    if tickers.is_empty() {
        return Err(GoldhandError::NoData {
            ticker: "all".into(),
        });
    }
    info!("Loading {} tickers from {}", tickers.len(), config.data_path);
    let universe = load_universe(&data_port, tickers)?;

    info!("Running {} strategy", config.strategy);
    let outcomes = run_batch(universe.jobs, &config.strategy, &config.features, &config.batch);

    let output_dir = output_override
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| config.output_dir.clone());
    let report = CsvReportAdapter::new();
    let mut failures = universe.skipped.len();

    for outcome in &outcomes {
        match outcome {
            TickerOutcome::Completed(result) => {
                report.write(result, &output_dir)?;
                println!("=== {} ===", result.ticker);
                println!("{}", result.summary);
            }
            TickerOutcome::Failed { ticker, reason } => {
                error!("{}: backtest failed: {}", ticker, reason);
                failures += 1;
            }
            TickerOutcome::Stalled { ticker } => {
                error!("{}: backtest did not finish in time", ticker);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        warn!("{} tickers were skipped or failed", failures);
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_features(config_path: &Path, ticker: &str, output: Option<&Path>) -> Result<ExitCode, GoldhandError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(PathBuf::from(&config.data_path));

    let ticker = ticker.trim().to_uppercase();
    let bars = data_port.fetch_bars(&ticker)?;
    if bars.is_empty() {
        return Err(GoldhandError::NoData { ticker });
    }

    let rows = build_features(&bars, &config.features);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(&config.output_dir).join(format!("{}_features.csv", ticker)));
    CsvReportAdapter::new().write_features(&rows, &path.display().to_string())?;

    Ok(ExitCode::SUCCESS)
}

fn run_list_tickers(config_path: &Path) -> Result<ExitCode, GoldhandError> {
    let config = load_config(config_path)?;
    let tickers = CsvAdapter::new(PathBuf::from(&config.data_path)).list_tickers()?;
    if tickers.is_empty() {
        info!("No tickers found in {}", config.data_path);
    }
    for ticker in tickers {
        println!("{}", ticker);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config_path: &Path) -> Result<ExitCode, GoldhandError> {
    let config = load_config(config_path)?;
    println!("Configuration is valid");
    println!("  data path: {}", config.data_path);
    if let Some(tickers) = &config.tickers {
        println!("  tickers:   {}", tickers.join(", "));
    }
    println!("  strategy:  {}", config.strategy);
    println!("  workers:   {}", config.batch.workers);
    println!("  output:    {}", config.output_dir);
    Ok(ExitCode::SUCCESS)
}
