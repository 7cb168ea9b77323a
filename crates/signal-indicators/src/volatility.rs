//! Volatility indicators.

use serde::{Deserialize, Serialize};
use signal_core::traits::{Indicator, MultiOutputIndicator};

use crate::moving_average::Sma;
use crate::simd;

/// Rolling sample standard deviation (n − 1 denominator).
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "StdDev needs at least two points");
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; data.len()];
        if data.len() < self.period {
            return result;
        }

        let period_f64 = self.period as f64;
        for (i, window) in data.windows(self.period).enumerate() {
            let mean = window.iter().sum::<f64>() / period_f64;
            let variance = simd::sum_sq_dev(window, mean) / (period_f64 - 1.0);
            result[i + self.period - 1] = variance.sqrt();
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Band columns, aligned with the input. `middle` is the SMA.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// SMA envelope at `k` sample standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// 20 bars, 2 deviations.
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> BollingerOutput {
        let middle = Sma::new(self.period).calculate(data);
        let std_dev = StdDev::new(self.period).calculate(data);

        let (upper, lower) = middle
            .iter()
            .zip(&std_dev)
            .map(|(m, s)| {
                let width = self.std_dev_multiplier * s;
                (m + width, m - width)
            })
            .unzip();

        BollingerOutput {
            upper,
            middle,
            lower,
        }
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}
