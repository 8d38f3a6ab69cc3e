//! Domain error types.

/// Top-level error type for goldhand.
///
/// Indicator, extrema and trade computations never fail on well-shaped input;
/// these variants cover ingestion, configuration and report writing only.
#[derive(Debug, thiserror::Error)]
pub enum GoldhandError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    #[error("malformed bar at row {row}: {reason}")]
    MalformedBar { row: usize, reason: String },

    #[error("data read error: {reason}")]
    DataRead { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GoldhandError> for std::process::ExitCode {
    fn from(err: &GoldhandError) -> Self {
        let code: u8 = match err {
            GoldhandError::Io(_) | GoldhandError::Csv(_) | GoldhandError::DataRead { .. } => 1,
            GoldhandError::ConfigParse { .. }
            | GoldhandError::ConfigMissing { .. }
            | GoldhandError::ConfigInvalid { .. }
            | GoldhandError::MissingColumn { .. } => 2,
            GoldhandError::MalformedBar { .. } => 3,
            GoldhandError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
