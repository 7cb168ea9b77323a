//! Consensus aggregation across the three detectors.

use serde::{Deserialize, Serialize};
use signal_core::traits::Detector;
use signal_core::types::{
    Bar, BarSeries, ConsensusSignal, DetectorBreakdown, DetectorSignal, Direction, SignalLevel,
    VoteCount,
};
use signal_core::SignalError;
use tracing::debug;

use crate::ema::{EmaDetector, EmaDetectorConfig};
use crate::kdj::{KdjDetector, KdjDetectorConfig};
use crate::macd::{MacdDetector, MacdDetectorConfig};

/// Detector parameters and level thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub ema: EmaDetectorConfig,
    pub macd: MacdDetectorConfig,
    pub kdj: KdjDetectorConfig,
    /// Mean strength at or above which a signal is strong
    pub strong_threshold: f64,
    /// Mean strength at or above which a signal is medium
    pub medium_threshold: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            ema: EmaDetectorConfig::default(),
            macd: MacdDetectorConfig::default(),
            kdj: KdjDetectorConfig::default(),
            strong_threshold: 0.8,
            medium_threshold: 0.6,
        }
    }
}

impl ConsensusConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        self.ema.validate()?;
        self.macd.validate()?;
        self.kdj.validate()?;

        for (name, value) in [
            ("strong_threshold", self.strong_threshold),
            ("medium_threshold", self.medium_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SignalError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.medium_threshold > self.strong_threshold {
            return Err(SignalError::Config(
                "medium_threshold must not exceed strong_threshold".into(),
            ));
        }
        Ok(())
    }
}

/// Runs the EMA, MACD and KDJ detectors and votes on their verdicts.
#[derive(Debug, Clone)]
pub struct ConsensusAggregator {
    ema: EmaDetector,
    macd: MacdDetector,
    kdj: KdjDetector,
    strong_threshold: f64,
    medium_threshold: f64,
}

impl ConsensusAggregator {
    /// Build an aggregator from a validated configuration.
    pub fn new(config: ConsensusConfig) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: ConsensusConfig) -> Self {
        Self {
            ema: EmaDetector::new(config.ema),
            macd: MacdDetector::new(config.macd),
            kdj: KdjDetector::new(config.kdj),
            strong_threshold: config.strong_threshold,
            medium_threshold: config.medium_threshold,
        }
    }

    /// Bars needed before every detector can vote.
    pub fn warmup_period(&self) -> usize {
        self.ema
            .warmup_period()
            .max(self.macd.warmup_period())
            .max(self.kdj.warmup_period())
    }

    /// Consensus for the most recent bar.
    pub fn evaluate(&self, series: &BarSeries) -> ConsensusSignal {
        let Some(bar) = series.last() else {
            return ConsensusSignal::empty();
        };

        let breakdown = DetectorBreakdown {
            ema: self.ema.detect(series),
            macd: self.macd.detect(series),
            kdj: self.kdj.detect(series),
        };
        let signal = self.combine(breakdown, bar);

        debug!(
            symbol = %series.symbol,
            direction = %signal.direction,
            level = %signal.level,
            strength = signal.strength,
            buy_count = signal.votes.buy_count,
            sell_count = signal.votes.sell_count,
            "Evaluated consensus"
        );
        signal
    }

    /// Consensus for every bar, each using only the history up to that bar.
    pub fn evaluate_series(&self, series: &BarSeries) -> Vec<ConsensusSignal> {
        let ema = self.ema.detect_series(series);
        let macd = self.macd.detect_series(series);
        let kdj = self.kdj.detect_series(series);

        series
            .iter()
            .zip(ema.into_iter().zip(macd).zip(kdj))
            .map(|(bar, ((ema, macd), kdj))| {
                self.combine(DetectorBreakdown { ema, macd, kdj }, bar)
            })
            .collect()
    }

    fn combine(&self, breakdown: DetectorBreakdown, bar: &Bar) -> ConsensusSignal {
        let signals: Vec<&DetectorSignal> = breakdown.iter().collect();
        let (direction, label, votes) = vote(&signals);
        let strength = mean_strength(&signals);

        ConsensusSignal {
            direction,
            strength,
            level: self.level(direction, strength),
            label: label.to_string(),
            breakdown,
            votes,
            timestamp: bar.timestamp,
            price: bar.close,
        }
    }

    fn level(&self, direction: Direction, strength: f64) -> SignalLevel {
        if direction.is_none() {
            SignalLevel::None
        } else if strength >= self.strong_threshold {
            SignalLevel::Strong
        } else if strength >= self.medium_threshold {
            SignalLevel::Medium
        } else {
            SignalLevel::Weak
        }
    }
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::from_config(ConsensusConfig::default())
    }
}

/// Majority vote. A lone vote with no opposition still counts, marked weak.
fn vote(signals: &[&DetectorSignal]) -> (Direction, &'static str, VoteCount) {
    let buy_count = signals
        .iter()
        .filter(|s| s.direction == Direction::Buy)
        .count();
    let sell_count = signals
        .iter()
        .filter(|s| s.direction == Direction::Sell)
        .count();

    let (direction, label) = match (buy_count, sell_count) {
        (b, _) if b >= 2 => (Direction::Buy, "buy"),
        (_, s) if s >= 2 => (Direction::Sell, "sell"),
        (1, 0) => (Direction::Buy, "buy (weak)"),
        (0, 1) => (Direction::Sell, "sell (weak)"),
        _ => (Direction::None, "none"),
    };

    let votes = VoteCount {
        buy_count,
        sell_count,
        total_indicators: signals.len(),
    };
    (direction, label, votes)
}

fn mean_strength(signals: &[&DetectorSignal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    signals.iter().map(|s| s.strength).sum::<f64>() / signals.len() as f64
}
