//! Moving average indicators.

use signal_core::traits::Indicator;

/// Rolling arithmetic mean over a fixed window.
#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "SMA window must be positive");
        Self { window }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let n = self.window;
        let mut out = Vec::with_capacity(data.len());
        let mut running = 0.0;

        for (i, &x) in data.iter().enumerate() {
            running += x;
            if i >= n {
                running -= data[i - n];
            }
            out.push(if i + 1 >= n { running / n as f64 } else { f64::NAN });
        }
        out
    }

    fn period(&self) -> usize {
        self.window
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Recursive smoothing `ema = α·x + (1 − α)·ema_prev`, seeded with the first
/// observed value. Leading NaNs in the input stay NaN in the output.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
}

impl Ema {
    /// Create a new EMA with the span-based smoothing factor α = 2/(n+1).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be positive");
        Self {
            alpha: 2.0 / (period as f64 + 1.0),
        }
    }

    /// Create an EMA with an explicit smoothing factor.
    pub fn with_alpha(alpha: f64) -> Self {
        assert!(
            alpha > 0.0 && alpha <= 1.0,
            "Smoothing factor must be in (0, 1]"
        );
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = Vec::with_capacity(data.len());
        let one_minus_alpha = 1.0 - self.alpha;
        let mut ema: Option<f64> = None;

        for &value in data {
            ema = match ema {
                Some(prev) => Some(value * self.alpha + prev * one_minus_alpha),
                None if value.is_nan() => None,
                None => Some(value),
            };
            result.push(ema.unwrap_or(f64::NAN));
        }

        result
    }

    /// Seeded from the first bar, so one value is enough.
    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
