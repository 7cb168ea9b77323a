//! MACD histogram detector.
//!
//! Crossings are read from the histogram sign rather than the MACD/signal
//! line pair: a flip from ≤ 0 to > 0 buys, the opposite flip sells.

use serde::{Deserialize, Serialize};
use signal_core::traits::{Detector, MultiOutputIndicator};
use signal_core::types::{BarSeries, Crossover, DetectorDetail, DetectorSignal, Direction, Trend};
use signal_core::SignalError;
use signal_indicators::Macd;

use crate::cross::crossover;

/// Configuration for the MACD detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdDetectorConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdDetectorConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdDetectorConfig {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.fast_period == 0 || self.signal_period == 0 {
            return Err(SignalError::Config(
                "MACD periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(SignalError::Config(
                "MACD fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }
}

/// MACD histogram sign-change detector.
#[derive(Debug, Clone)]
pub struct MacdDetector {
    config: MacdDetectorConfig,
}

impl MacdDetector {
    pub fn new(config: MacdDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MacdDetectorConfig {
        &self.config
    }

    /// Blend of histogram magnitude (relative to the largest seen so far)
    /// and the MACD/signal gap relative to MACD.
    fn strength(macd: f64, signal: f64, histogram: f64, max_abs_hist: f64) -> f64 {
        let magnitude = if max_abs_hist > 0.0 {
            (histogram.abs() / max_abs_hist).min(1.0)
        } else {
            0.0
        };

        let strength = if macd != 0.0 {
            (magnitude + (macd - signal).abs() / macd.abs()) / 2.0
        } else {
            magnitude
        };
        strength.clamp(0.0, 1.0)
    }
}

impl Default for MacdDetector {
    fn default() -> Self {
        Self::new(MacdDetectorConfig::default())
    }
}

impl Detector for MacdDetector {
    fn name(&self) -> &str {
        "MACD"
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period
    }

    fn detect_series(&self, series: &BarSeries) -> Vec<DetectorSignal> {
        let closes = series.closes();
        let cfg = &self.config;
        let out = Macd::with_periods(cfg.fast_period, cfg.slow_period, cfg.signal_period)
            .calculate(&closes);

        let mut max_abs_hist: f64 = 0.0;
        let mut signals = Vec::with_capacity(closes.len());

        for i in 0..closes.len() {
            // Running max keeps the normalisation causal
            max_abs_hist = max_abs_hist.max(out.histogram[i].abs());

            if !self.is_warmed_up(i + 1) {
                signals.push(DetectorSignal::none());
                continue;
            }

            let (macd, signal, hist) = (out.macd[i], out.signal[i], out.histogram[i]);
            let prev_hist = out.histogram[i.saturating_sub(1)];
            let strength = Self::strength(macd, signal, hist, max_abs_hist);
            let cross = crossover(prev_hist, 0.0, hist, 0.0);

            let detail = |crossover: Option<Crossover>, trend: Option<Trend>| DetectorDetail::Macd {
                macd,
                signal,
                histogram: hist,
                crossover,
                trend,
                price: closes[i],
            };

            signals.push(match cross {
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
                    let trend = if hist > 0.0 {
                        Trend::Bullish
                    } else {
                        Trend::Bearish
                    };
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
            });
        }

        signals
    }
}
