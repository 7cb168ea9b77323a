//! Bar sources for the signal desk.

mod csv_source;

pub use csv_source::CsvBarSource;

use signal_core::error::DataError;
use signal_core::traits::BarSource;
use signal_core::types::{BarSeries, Timeframe};
use std::path::Path;

/// Load every bar of a single CSV file.
pub async fn load_csv(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<BarSeries, DataError> {
    CsvBarSource::file(path.as_ref()).get_bars(symbol, timeframe, 0).await
}
