//! Price bars and ordered bar series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::DataError;

/// One OHLCV bar. Prices are `f64` to feed the indicator math directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar open time. Out-of-range timestamps map to the epoch.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}

/// Bars of one instrument at one interval, oldest first.
///
/// Evaluation only ever looks at a series, never at a single bar, so every
/// detector sees the same history the backtester replays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
        }
    }

    /// Build a series from bars, rejecting timestamps that are not strictly increasing.
    pub fn from_bars(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: impl IntoIterator<Item = Bar>,
    ) -> Result<Self, DataError> {
        let mut series = Self::new(symbol, timeframe);
        for (index, bar) in bars.into_iter().enumerate() {
            if let Some(prev) = series.last() {
                if bar.timestamp <= prev.timestamp {
                    return Err(DataError::OutOfOrder {
                        index,
                        timestamp: bar.timestamp,
                        previous: prev.timestamp,
                    });
                }
            }
            series.bars.push(bar);
        }
        Ok(series)
    }

    /// Append a bar. The caller keeps timestamps increasing.
    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    pub fn extend(&mut self, bars: impl IntoIterator<Item = Bar>) {
        self.bars.extend(bars);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    /// The bar being evaluated.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// History up to and including bar `len - 1`, as a new series.
    pub fn prefix(&self, len: usize) -> BarSeries {
        Self {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            bars: self.bars[..len.min(self.bars.len())].to_vec(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(|b| b.close)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(|b| b.high)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(|b| b.low)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    fn column(&self, f: impl Fn(&Bar) -> f64) -> Vec<f64> {
        self.bars.iter().map(f).collect()
    }
}
