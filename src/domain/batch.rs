//! Multi-symbol batch runner.
//!
//! Each ticker is an independent single-symbol backtest, so a batch is a fixed
//! pool of worker threads pulling jobs from one channel and pushing outcomes
//! into another. Outcomes arrive in completion order tagged with their ticker.
//! A run that panics becomes [`TickerOutcome::Failed`]; with a timeout,
//! tickers still pending at the deadline become [`TickerOutcome::Stalled`] and
//! the batch returns without waiting for them.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{info, warn};

use super::backtest::{run_backtest, BacktestResult};
use super::features::FeatureConfig;
use super::ohlcv::OhlcvBar;
use super::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub workers: usize,
    /// Deadline for the whole batch; `None` waits for every ticker.
    pub timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout: None,
        }
    }
}

pub fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[derive(Debug, Clone)]
pub struct TickerJob {
    pub ticker: String,
    pub bars: Vec<OhlcvBar>,
}

#[derive(Debug, Clone)]
pub enum TickerOutcome {
    Completed(BacktestResult),
    Failed { ticker: String, reason: String },
    Stalled { ticker: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Completed(result) => &result.ticker,
            TickerOutcome::Failed { ticker, .. } | TickerOutcome::Stalled { ticker } => ticker,
        }
    }
}

struct OutcomeMsg {
    id: usize,
    outcome: TickerOutcome,
}

pub fn run_batch(
    jobs: Vec<TickerJob>,
    strategy_config: &StrategyConfig,
    feature_config: &FeatureConfig,
    batch_config: &BatchConfig,
) -> Vec<TickerOutcome> {
    let strategy_config = strategy_config.clone();
    let feature_config = feature_config.clone();
    run_batch_with(jobs, batch_config, move |job: &TickerJob| {
        run_backtest(&job.ticker, &job.bars, &strategy_config, &feature_config)
    })
}

/// Run `runner` for every job on the worker pool.
pub fn run_batch_with<F>(jobs: Vec<TickerJob>, batch_config: &BatchConfig, runner: F) -> Vec<TickerOutcome>
where
    F: Fn(&TickerJob) -> BacktestResult + Send + Sync + 'static,
{
    let total = jobs.len();
    if total == 0 {
        return Vec::new();
    }

    let num_workers = total.min(batch_config.workers.max(1));
    info!("Running {} tickers on {} worker threads", total, num_workers);

    let (task_tx, task_rx): (Sender<(usize, TickerJob)>, Receiver<(usize, TickerJob)>) = bounded(total);
    let (result_tx, result_rx): (Sender<OutcomeMsg>, Receiver<OutcomeMsg>) = bounded(total);

    let runner = Arc::new(runner);
    for _ in 0..num_workers {
        let rx = task_rx.clone();
        let result_tx = result_tx.clone();
        let runner = Arc::clone(&runner);

        thread::spawn(move || {
            while let Ok((id, job)) = rx.recv() {
                let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (*runner)(&job))) {
                    Ok(result) => TickerOutcome::Completed(result),
                    Err(payload) => TickerOutcome::Failed {
                        ticker: job.ticker.clone(),
                        reason: panic_message(payload.as_ref()),
                    },
                };
                if result_tx.send(OutcomeMsg { id, outcome }).is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    let mut pending: BTreeMap<usize, String> = BTreeMap::new();
    for (id, job) in jobs.into_iter().enumerate() {
        pending.insert(id, job.ticker.clone());
        if task_tx.send((id, job)).is_err() {
            break;
        }
    }
    drop(task_tx);

    let deadline = batch_config.timeout.map(|t| Instant::now() + t);
    let mut outcomes = Vec::with_capacity(total);

    while !pending.is_empty() {
        let received = match deadline {
            Some(deadline) => result_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => result_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(OutcomeMsg { id, outcome }) => {
                pending.remove(&id);
                match &outcome {
                    TickerOutcome::Completed(result) => info!(
                        "Completed {} ({} trades, cumulative {:.4})",
                        result.ticker, result.summary.number_of_trades, result.summary.cumulative_result
                    ),
                    TickerOutcome::Failed { ticker, reason } => warn!("Backtest for {} failed: {}", ticker, reason),
                    TickerOutcome::Stalled { .. } => {}
                }
                outcomes.push(outcome);
            }
            Err(RecvTimeoutError::Timeout) => {
                for ticker in pending.values() {
                    warn!("Backtest for {} did not finish before the batch timeout", ticker);
                }
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Worker pool stopped with {} tickers pending", pending.len());
                break;
            }
        }
    }

    outcomes.extend(
        pending
            .into_values()
            .map(|ticker| TickerOutcome::Stalled { ticker }),
    );
    outcomes
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "backtest panicked".to_string()
    }
}
