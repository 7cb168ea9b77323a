//! CSV bar source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use signal_core::error::DataError;
use signal_core::traits::BarSource;
use signal_core::types::{Bar, BarSeries, Timeframe};
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

#[derive(Debug, Clone)]
enum Location {
    /// One file per instrument and interval
    Dir(PathBuf),
    /// A single file served for any instrument
    File(PathBuf),
}

/// Reads bars that an external fetcher already wrote to disk.
///
/// In directory mode the bars of `AR/USDT` at `4h` are read from
/// `<dir>/AR_USDT_4h.csv`.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    location: Location,
}

impl CsvBarSource {
    /// Source backed by a directory of per-instrument files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Dir(dir.into()),
        }
    }

    /// Source backed by one file, whatever instrument is asked for.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// File the bars of `symbol` at `timeframe` are read from.
    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        match &self.location {
            Location::File(path) => path.clone(),
            Location::Dir(dir) => {
                let stem: String = symbol
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                    .collect();
                dir.join(format!("{}_{}.csv", stem, timeframe))
            }
        }
    }

    /// Parse CSV content into bars sorted by timestamp.
    fn parse(content: &[u8]) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let mut bars = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;

            let timestamp = parse_timestamp(&record.date)?;

            bars.push(Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        // Sort by timestamp
        bars.sort_by_key(|b| b.timestamp);

        Ok(bars)
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarSeries, DataError> {
        let path = self.path_for(symbol, timeframe);
        let content = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DataError::SymbolNotFound(symbol.to_string()),
            _ => DataError::Internal(format!("{}: {}", path.display(), e)),
        })?;

        let bars = Self::parse(&content)?;
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        let skip = if limit == 0 { 0 } else { bars.len().saturating_sub(limit) };
        let series = BarSeries::from_bars(symbol, timeframe, bars.into_iter().skip(skip))?;

        debug!(
            symbol,
            timeframe = %timeframe,
            path = %path.display(),
            bars = series.len(),
            "Loaded bars"
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various timestamp formats into unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds if more than 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}
