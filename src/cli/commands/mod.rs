//! CLI command implementations.

pub mod backtest;
pub mod evaluate;
pub mod positions;
pub mod validate;
pub mod watch;

use signal_config::AppConfig;
use signal_data::CsvBarSource;
use signal_ledger::{JsonFileStore, PositionLedger};
use std::path::Path;

/// Bar source for `--data`: a single file, a directory, or the configured directory.
pub fn bar_source(data: Option<&Path>, config: &AppConfig) -> CsvBarSource {
    match data {
        Some(path) if path.is_file() => CsvBarSource::file(path),
        Some(dir) => CsvBarSource::new(dir),
        None => CsvBarSource::new(&config.data.dir),
    }
}

/// Open the configured JSON ledger.
pub fn open_ledger(config: &AppConfig) -> PositionLedger<JsonFileStore> {
    PositionLedger::open(
        JsonFileStore::new(&config.ledger.path),
        config.signals.max_holding_days,
    )
}
