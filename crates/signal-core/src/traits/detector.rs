//! Detector trait definition.

use crate::types::{BarSeries, DetectorSignal};

/// A single-indicator signal detector.
///
/// Detectors derive their own indicator values from the bar series and
/// report a verdict per bar. Only history up to the evaluated bar is used,
/// so the verdict for bar `i` of a long series equals the latest-bar verdict
/// of the series truncated after `i`.
pub trait Detector: Send + Sync {
    /// Get the unique name of this detector.
    fn name(&self) -> &str;

    /// Number of bars needed before a verdict other than "none" is possible.
    fn warmup_period(&self) -> usize;

    /// Evaluate every bar of the series (backtest path).
    fn detect_series(&self, series: &BarSeries) -> Vec<DetectorSignal>;

    /// Evaluate the most recent bar (live path).
    fn detect(&self, series: &BarSeries) -> DetectorSignal {
        self.detect_series(series)
            .pop()
            .unwrap_or_else(DetectorSignal::none)
    }

    /// Check if the detector has enough data.
    fn is_warmed_up(&self, bars_available: usize) -> bool {
        bars_available >= self.warmup_period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, Direction, Timeframe};

    struct UpCloseDetector;

    impl Detector for UpCloseDetector {
        fn name(&self) -> &str {
            "up-close"
        }

        fn warmup_period(&self) -> usize {
            2
        }

        fn detect_series(&self, series: &BarSeries) -> Vec<DetectorSignal> {
            let closes = series.closes();
            (0..closes.len())
                .map(|i| {
                    if !self.is_warmed_up(i + 1) || closes[i] <= closes[i - 1] {
                        DetectorSignal::none()
                    } else {
                        DetectorSignal {
                            direction: Direction::Buy,
                            strength: 1.0,
                            label: "buy".into(),
                            ..Default::default()
                        }
                    }
                })
                .collect()
        }
    }

    #[test]
    fn test_default_detect_uses_last_bar() {
        let mut series = BarSeries::new("X", Timeframe::Daily);
        assert_eq!(UpCloseDetector.detect(&series), DetectorSignal::none());

        series.push(Bar::new(1, 1.0, 1.0, 1.0, 1.0, 0.0));
        series.push(Bar::new(2, 2.0, 2.0, 2.0, 2.0, 0.0));
        assert_eq!(UpCloseDetector.detect(&series).direction, Direction::Buy);
    }
}
