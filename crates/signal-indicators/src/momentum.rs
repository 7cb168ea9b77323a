//! Momentum indicators.

use serde::{Deserialize, Serialize};
use signal_core::traits::{Indicator, MultiOutputIndicator};

use crate::moving_average::Ema;
use crate::simd;

/// Relative Strength Index (RSI).
///
/// Uses a simple rolling mean of gains and losses over the trailing
/// `period` price changes. A window without losses reads 100.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; data.len()];
        if data.len() <= self.period {
            return result;
        }

        let (gains, losses) = simd::split_deltas(data);
        let period_f64 = self.period as f64;

        let mut gain_sum: f64 = gains[..self.period].iter().sum();
        let mut loss_sum: f64 = losses[..self.period].iter().sum();

        // gains[j] is the move into bar j + 1
        for i in self.period..data.len() {
            if i > self.period {
                gain_sum += gains[i - 1] - gains[i - 1 - self.period];
                loss_sum += losses[i - 1] - losses[i - 1 - self.period];
            }

            let avg_gain = gain_sum / period_f64;
            let avg_loss = loss_sum / period_f64;
            result[i] = if avg_loss <= 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
            };
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD series, aligned with the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: Vec<f64>,
    /// Signal line (EMA of MACD)
    pub signal: Vec<f64>,
    /// Histogram (MACD - Signal)
    pub histogram: Vec<f64>,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> MacdOutput {
        let fast = Ema::new(self.fast_period).calculate(data);
        let slow = Ema::new(self.slow_period).calculate(data);

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = Ema::new(self.signal_period).calculate(&macd);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdOutput {
            macd,
            signal,
            histogram,
        }
    }

    /// EMAs are seeded from the first bar; the slow span is the meaningful warm-up.
    fn period(&self) -> usize {
        self.slow_period
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// KDJ series, aligned with the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KdjOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

/// KDJ stochastic oscillator.
///
/// RSV measures the close against the `period`-bar high/low range; K and D
/// smooth it with α = 1/k_smooth and α = 1/d_smooth, and J = 3K − 2D.
#[derive(Debug, Clone)]
pub struct Kdj {
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
}

impl Kdj {
    /// Create a KDJ with default parameters (9, 3, 3).
    pub fn new() -> Self {
        Self::with_periods(9, 3, 3)
    }

    pub fn with_periods(period: usize, k_smooth: usize, d_smooth: usize) -> Self {
        assert!(period > 0 && k_smooth > 0 && d_smooth > 0);
        Self {
            period,
            k_smooth,
            d_smooth,
        }
    }

    /// Raw stochastic value per bar.
    ///
    /// Bars inside the warm-up window and bars with a flat range read 50, the
    /// neutral midpoint, so that the K/D recursion always has a seed.
    pub fn rsv(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        let mut rsv = vec![50.0; len];

        for i in (self.period.saturating_sub(1))..len {
            let start = i + 1 - self.period;
            let highest = simd::minmax(&high[start..=i]).map_or(f64::NAN, |(_, max)| max);
            let lowest = simd::minmax(&low[start..=i]).map_or(f64::NAN, |(min, _)| min);

            let range = highest - lowest;
            if range > 0.0 {
                rsv[i] = (close[i] - lowest) / range * 100.0;
            }
        }

        rsv
    }

    /// Smooth an RSV series into K, D and J, including the seeded warm-up bars.
    pub fn smooth(&self, rsv: &[f64]) -> KdjOutput {
        let k = Ema::with_alpha(1.0 / self.k_smooth as f64).calculate(rsv);
        let d = Ema::with_alpha(1.0 / self.d_smooth as f64).calculate(&k);
        let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

        KdjOutput { k, d, j }
    }

    /// Calculate K, D and J from high/low/close data.
    ///
    /// Bars without a full lookback window are `NaN`.
    pub fn calculate_hlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> KdjOutput {
        let rsv = self.rsv(high, low, close);
        let mut output = self.smooth(&rsv);

        let undefined = self.period.saturating_sub(1).min(rsv.len());
        for series in [&mut output.k, &mut output.d, &mut output.j] {
            series[..undefined].fill(f64::NAN);
        }

        output
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for Kdj {
    fn default() -> Self {
        Self::new()
    }
}
