//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::GoldhandError;
use crate::domain::features::FeatureRow;

/// Port for writing backtest output for one ticker.
pub trait ReportPort {
    /// Write the trade table and the summary under `output_dir`.
    fn write(&self, result: &BacktestResult, output_dir: &str) -> Result<(), GoldhandError>;

    /// Write the feature table to `output_path`.
    fn write_features(&self, rows: &[FeatureRow], output_path: &str) -> Result<(), GoldhandError>;
}
