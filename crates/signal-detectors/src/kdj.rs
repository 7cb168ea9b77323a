//! KDJ stochastic detector.
//!
//! Trades K/D crossings. A crossing out of the matching extreme zone
//! (up from oversold, down from overbought) earns a strength bonus.

use serde::{Deserialize, Serialize};
use signal_core::traits::Detector;
use signal_core::types::{BarSeries, Crossover, DetectorDetail, DetectorSignal, Direction, Zone};
use signal_core::SignalError;
use signal_indicators::Kdj;

use crate::cross::crossover;

const OVERSOLD: f64 = 20.0;
const OVERBOUGHT: f64 = 80.0;
const ZONE_BONUS: f64 = 0.3;

/// Configuration for the KDJ detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdjDetectorConfig {
    /// RSV lookback, also the warm-up length
    pub period: usize,
    /// K smoothing (α = 1/k_period)
    pub k_period: usize,
    /// D smoothing (α = 1/d_period)
    pub d_period: usize,
}

impl Default for KdjDetectorConfig {
    fn default() -> Self {
        Self {
            period: 9,
            k_period: 3,
            d_period: 3,
        }
    }
}

impl KdjDetectorConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.period == 0 || self.k_period == 0 || self.d_period == 0 {
            return Err(SignalError::Config(
                "KDJ periods must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// K/D crossover detector.
#[derive(Debug, Clone)]
pub struct KdjDetector {
    config: KdjDetectorConfig,
}

impl KdjDetector {
    pub fn new(config: KdjDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KdjDetectorConfig {
        &self.config
    }

    fn zone(k: f64, d: f64) -> Zone {
        if k < OVERSOLD && d < OVERSOLD {
            Zone::Oversold
        } else if k > OVERBOUGHT && d > OVERBOUGHT {
            Zone::Overbought
        } else {
            Zone::Neutral
        }
    }
}

impl Default for KdjDetector {
    fn default() -> Self {
        Self::new(KdjDetectorConfig::default())
    }
}

impl Detector for KdjDetector {
    fn name(&self) -> &str {
        "KDJ"
    }

    fn warmup_period(&self) -> usize {
        self.config.period
    }

    fn detect_series(&self, series: &BarSeries) -> Vec<DetectorSignal> {
        let cfg = &self.config;
        let kdj = Kdj::with_periods(cfg.period, cfg.k_period, cfg.d_period);
        let closes = series.closes();

        // Use the seeded warm-up values so the first evaluated bar has a
        // previous K/D to cross against.
        let rsv = kdj.rsv(&series.highs(), &series.lows(), &closes);
        let out = kdj.smooth(&rsv);

        (0..closes.len())
            .map(|i| {
                if !self.is_warmed_up(i + 1) {
                    return DetectorSignal::none();
                }

                let prev = i.saturating_sub(1);
                let (k, d, j) = (out.k[i], out.d[i], out.j[i]);
                let zone = Self::zone(k, d);
                let base = ((k - d).abs() / 50.0).min(1.0);
                let cross = crossover(out.k[prev], out.d[prev], k, d);

                let detail = DetectorDetail::Kdj {
                    k,
                    d,
                    j,
                    crossover: cross,
                    zone,
                    price: closes[i],
                };

                let (direction, strength, label) = match (cross, zone) {
                    (Some(Crossover::Up), Zone::Oversold) => {
                        (Direction::Buy, (base + ZONE_BONUS).min(1.0), "buy")
                    }
                    (Some(Crossover::Down), Zone::Overbought) => {
                        (Direction::Sell, (base + ZONE_BONUS).min(1.0), "sell")
                    }
                    (Some(Crossover::Up), _) => (Direction::Buy, base, "buy"),
                    (Some(Crossover::Down), _) => (Direction::Sell, base, "sell"),
                    (None, Zone::Oversold) => (Direction::None, base * 0.3, "oversold zone"),
                    (None, Zone::Overbought) => (Direction::None, base * 0.3, "overbought zone"),
                    (None, Zone::Neutral) => (Direction::None, base * 0.3, "neutral zone"),
                };

                DetectorSignal {
                    direction,
                    strength,
                    label: label.into(),
                    detail,
                }
            })
            .collect()
    }
}
