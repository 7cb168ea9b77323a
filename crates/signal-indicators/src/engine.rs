//! Indicator engine: per-bar indicator columns and rule markers.
//!
//! The annotated series is what the chart collaborator consumes and what the
//! rule-based backtest runs on. Markers follow the classic moving-average
//! crossover rule, confirmed by the MACD histogram and RSI.

use std::io;

use serde::{Deserialize, Serialize};
use signal_core::traits::{Indicator, MultiOutputIndicator};
use signal_core::types::{Bar, BarSeries, Direction};
use tracing::debug;

use crate::momentum::{Macd, Rsi};
use crate::moving_average::Sma;
use crate::volatility::BollingerBands;

/// Window lengths used by [`IndicatorEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ma_fast: usize,
    pub ma_slow: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ma_fast: 20,
            ma_slow: 60,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
        }
    }
}

/// Rule verdict for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMarker {
    pub direction: Direction,
    pub strength: f64,
}

/// Bars plus every indicator column, all aligned by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub ma_fast: Vec<f64>,
    pub ma_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub markers: Vec<SignalMarker>,
}

impl AnnotatedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Marker directions, one per bar.
    pub fn directions(&self) -> Vec<Direction> {
        self.markers.iter().map(|m| m.direction).collect()
    }

    /// Indices and markers of the bars that carry a buy or sell.
    pub fn signals(&self) -> impl Iterator<Item = (usize, &SignalMarker)> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.direction.is_none())
    }

    /// Export the annotated bars as CSV. Undefined values are empty cells.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "timestamp",
            "open",
            "high",
            "low",
            "close",
            "volume",
            "ma_fast",
            "ma_slow",
            "macd",
            "macd_signal",
            "macd_hist",
            "rsi",
            "bb_upper",
            "bb_middle",
            "bb_lower",
            "signal",
            "signal_strength",
        ])?;

        for (i, bar) in self.bars.iter().enumerate() {
            let marker = self.markers.get(i).copied().unwrap_or_default();
            let signal = marker.direction.as_marker().to_string();
            let strength = if marker.direction.is_none() {
                String::new()
            } else {
                marker.strength.to_string()
            };

            wtr.write_record([
                bar.timestamp.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
                cell(&self.ma_fast, i),
                cell(&self.ma_slow, i),
                cell(&self.macd, i),
                cell(&self.macd_signal, i),
                cell(&self.macd_hist, i),
                cell(&self.rsi, i),
                cell(&self.bb_upper, i),
                cell(&self.bb_middle, i),
                cell(&self.bb_lower, i),
                signal,
                strength,
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn cell(column: &[f64], index: usize) -> String {
    match column.get(index) {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => String::new(),
    }
}

/// Computes indicator columns for a bar series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: EngineConfig,
}

impl IndicatorEngine {
    pub fn new(config: EngineConfig) -> Self {
        assert!(
            config.ma_fast < config.ma_slow,
            "Fast MA must be shorter than slow MA"
        );
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute every column and the rule markers for `series`.
    pub fn annotate(&self, series: &BarSeries) -> AnnotatedSeries {
        let closes = series.closes();
        let cfg = &self.config;

        let ma_fast = Sma::new(cfg.ma_fast).calculate(&closes);
        let ma_slow = Sma::new(cfg.ma_slow).calculate(&closes);
        let macd = Macd::with_periods(cfg.macd_fast, cfg.macd_slow, cfg.macd_signal)
            .calculate(&closes);
        let rsi = Rsi::new(cfg.rsi_period).calculate(&closes);
        let bb = BollingerBands::with_params(cfg.bb_period, cfg.bb_std_dev).calculate(&closes);

        let markers = rule_markers(&ma_fast, &ma_slow, &macd.histogram, &rsi);
        debug!(
            symbol = %series.symbol,
            bars = closes.len(),
            signals = markers.iter().filter(|m| !m.direction.is_none()).count(),
            "Annotated series"
        );

        AnnotatedSeries {
            symbol: series.symbol.clone(),
            bars: series.as_slice().to_vec(),
            ma_fast,
            ma_slow,
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
            rsi,
            bb_upper: bb.upper,
            bb_middle: bb.middle,
            bb_lower: bb.lower,
            markers,
        }
    }
}

/// Moving-average crossover confirmed by momentum.
///
/// Buy: fast crosses above slow, histogram > 0, RSI > 50.
/// Sell: fast crosses below slow, histogram < 0, RSI < 60.
fn rule_markers(ma_fast: &[f64], ma_slow: &[f64], hist: &[f64], rsi: &[f64]) -> Vec<SignalMarker> {
    let len = ma_fast.len();
    let mut markers = vec![SignalMarker::default(); len];

    for i in 1..len {
        let (fast, slow) = (ma_fast[i], ma_slow[i]);
        let (prev_fast, prev_slow) = (ma_fast[i - 1], ma_slow[i - 1]);
        let (h, r) = (hist[i], rsi[i]);

        // Undefined inputs never fire
        if [fast, slow, prev_fast, prev_slow, h, r].iter().any(|v| v.is_nan()) {
            continue;
        }

        let direction = if prev_fast <= prev_slow && fast > slow && h > 0.0 && r > 50.0 {
            Direction::Buy
        } else if prev_fast >= prev_slow && fast < slow && h < 0.0 && r < 60.0 {
            Direction::Sell
        } else {
            continue;
        };

        let ma_term = if slow != 0.0 {
            (fast - slow).abs() / slow * 10.0
        } else {
            0.0
        };
        let rsi_term = (r - 50.0).abs() / 50.0;

        markers[i] = SignalMarker {
            direction,
            strength: (0.5 * ma_term + 0.5 * rsi_term).clamp(0.0, 1.0),
        };
    }

    markers
}
