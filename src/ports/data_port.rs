//! Bar source port trait.

use crate::domain::error::GoldhandError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars for `ticker`, ascending by date with unique dates.
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, GoldhandError>;

    /// Tickers this source can serve.
    fn list_tickers(&self) -> Result<Vec<String>, GoldhandError>;
}
