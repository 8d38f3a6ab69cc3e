//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod extrema;
pub mod features;
pub mod strategy;
pub mod position;
pub mod execution;
pub mod metrics;
pub mod backtest;
pub mod batch;
pub mod universe;
pub mod config_validation;
pub mod error;

/// Round half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
