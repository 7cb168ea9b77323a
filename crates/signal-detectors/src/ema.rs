//! EMA crossover detector.
//!
//! Buys when the fast EMA crosses above the slow EMA and sells on the
//! opposite crossing. Between crossings it reports the trend bias at half
//! strength without a tradable direction.

use serde::{Deserialize, Serialize};
use signal_core::traits::{Detector, Indicator};
use signal_core::types::{BarSeries, Crossover, DetectorDetail, DetectorSignal, Direction, Trend};
use signal_core::SignalError;
use signal_indicators::Ema;

use crate::cross::crossover;

/// Configuration for the EMA detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaDetectorConfig {
    /// Fast EMA span
    pub fast_period: usize,
    /// Slow EMA span, also the warm-up length
    pub slow_period: usize,
}

impl Default for EmaDetectorConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
        }
    }
}

impl EmaDetectorConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.fast_period == 0 {
            return Err(SignalError::Config(
                "EMA fast period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(SignalError::Config(
                "EMA fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }
}

/// Fast/slow EMA crossover detector.
#[derive(Debug, Clone)]
pub struct EmaDetector {
    config: EmaDetectorConfig,
}

impl EmaDetector {
    pub fn new(config: EmaDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmaDetectorConfig {
        &self.config
    }

    fn evaluate_at(&self, closes: &[f64], fast: &[f64], slow: &[f64], i: usize) -> DetectorSignal {
        let prev = i.saturating_sub(1);
        let (f, s, price) = (fast[i], slow[i], closes[i]);

        let gap = if s > 0.0 { (f - s).abs() / s } else { 0.0 };
        let slope = if price > 0.0 {
            (f - fast[prev]).abs() / price
        } else {
            0.0
        };
        let strength = (gap * 10.0 + slope * 100.0).min(1.0);

        let cross = crossover(fast[prev], slow[prev], f, s);
        let detail = |crossover: Option<Crossover>, trend: Option<Trend>| DetectorDetail::Ema {
            ema_fast: f,
            ema_slow: s,
            crossover,
            trend,
            price,
        };

        match cross {
            Some(Crossover::Up) => DetectorSignal {
                direction: Direction::Buy,
                strength,
                label: "buy".into(),
                detail: detail(cross, None),
            },
            Some(Crossover::Down) => DetectorSignal {
                direction: Direction::Sell,
                strength,
                label: "sell".into(),
                detail: detail(cross, None),
            },
            None => {
                let trend = if f > s { Trend::Bullish } else { Trend::Bearish };
                DetectorSignal {
                    direction: Direction::None,
                    strength: strength * 0.5,
                    label: match trend {
                        Trend::Bullish => "bullish trend".into(),
                        Trend::Bearish => "bearish trend".into(),
                    },
                    detail: detail(None, Some(trend)),
                }
            }
        }
    }
}

impl Default for EmaDetector {
    fn default() -> Self {
        Self::new(EmaDetectorConfig::default())
    }
}

impl Detector for EmaDetector {
    fn name(&self) -> &str {
        "EMA"
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period
    }

    fn detect_series(&self, series: &BarSeries) -> Vec<DetectorSignal> {
        let closes = series.closes();
        let fast = Ema::new(self.config.fast_period).calculate(&closes);
        let slow = Ema::new(self.config.slow_period).calculate(&closes);

        (0..closes.len())
            .map(|i| {
                if self.is_warmed_up(i + 1) {
                    self.evaluate_at(&closes, &fast, &slow, i)
                } else {
                    DetectorSignal::none()
                }
            })
            .collect()
    }
}
