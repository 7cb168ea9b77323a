//! Property tests for detector and consensus invariants.
//!
//! Uses proptest to verify:
//! 1. Short series never produce a verdict
//! 2. Strengths stay within [0, 1] on arbitrary price paths
//! 3. Consensus direction, level and votes stay consistent
//! 4. Mirroring the MACD input flips every histogram crossing

use proptest::prelude::*;
use signal_core::traits::Detector;
use signal_core::types::{Bar, BarSeries, DetectorDetail, Direction, SignalLevel, Timeframe};
use signal_detectors::{ConsensusAggregator, EmaDetector, KdjDetector, MacdDetector};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of closes with whole-cent steps.
fn arb_closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-200i32..=200, min_len..max_len).prop_map(|steps| {
        let mut price = 100.0_f64;
        steps
            .into_iter()
            .map(|step| {
                price = (price + step as f64 / 100.0).max(1.0);
                price
            })
            .collect()
    })
}

fn to_series(closes: &[f64]) -> BarSeries {
    let mut series = BarSeries::new("PROP", Timeframe::Hour4);
    series.extend(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 1_000, c, c + 0.25, c - 0.25, c, 1.0)),
    );
    series
}

// ── 1. Short series ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_series_is_none(closes in arb_closes(0, 9)) {
        let series = to_series(&closes);

        for signal in [
            EmaDetector::default().detect(&series),
            MacdDetector::default().detect(&series),
            KdjDetector::default().detect(&series),
        ] {
            prop_assert_eq!(signal.direction, Direction::None);
            prop_assert_eq!(signal.strength, 0.0);
        }
    }
}

// ── 2. Strength bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn strengths_are_bounded(closes in arb_closes(30, 150)) {
        let series = to_series(&closes);
        let detectors: [&dyn Detector; 3] = [
            &EmaDetector::default(),
            &MacdDetector::default(),
            &KdjDetector::default(),
        ];

        for detector in detectors {
            for signal in detector.detect_series(&series) {
                prop_assert!((0.0..=1.0).contains(&signal.strength));
            }
        }
    }
}

// ── 3. Consensus consistency ─────────────────────────────────────────

proptest! {
    #[test]
    fn consensus_is_consistent(closes in arb_closes(1, 120)) {
        let series = to_series(&closes);
        let signals = ConsensusAggregator::default().evaluate_series(&series);
        prop_assert_eq!(signals.len(), closes.len());

        for (signal, bar) in signals.iter().zip(series.iter()) {
            prop_assert_eq!(signal.timestamp, bar.timestamp);
            prop_assert_eq!(signal.price, bar.close);
            prop_assert_eq!(signal.votes.total_indicators, 3);
            prop_assert!(signal.votes.buy_count + signal.votes.sell_count <= 3);

            let mean = signal.breakdown.iter().map(|s| s.strength).sum::<f64>() / 3.0;
            prop_assert!((signal.strength - mean).abs() < 1e-12);

            match signal.direction {
                Direction::None => prop_assert_eq!(signal.level, SignalLevel::None),
                Direction::Buy => {
                    prop_assert!(signal.level > SignalLevel::None);
                    prop_assert!(signal.votes.buy_count >= 2 || signal.votes.sell_count == 0);
                }
                Direction::Sell => {
                    prop_assert!(signal.level > SignalLevel::None);
                    prop_assert!(signal.votes.sell_count >= 2 || signal.votes.buy_count == 0);
                }
            }
        }
    }
}

// ── 4. Crossover anti-symmetry ───────────────────────────────────────

proptest! {
    #[test]
    fn mirrored_macd_flips_direction(closes in arb_closes(30, 120)) {
        let mirrored: Vec<f64> = closes.iter().map(|c| 1_000.0 - c).collect();
        let detector = MacdDetector::default();

        let original = detector.detect_series(&to_series(&closes));
        let flipped = detector.detect_series(&to_series(&mirrored));

        let mut prev_hist = 0.0_f64;
        for (a, b) in original.iter().zip(&flipped) {
            let hist = match a.detail {
                DetectorDetail::Macd { histogram, .. } => histogram,
                _ => continue,
            };
            // Crossings decided by rounding noise are not meaningful
            let near_zero = hist.abs() < 1e-9 || prev_hist.abs() < 1e-9;
            prev_hist = hist;
            if near_zero {
                continue;
            }
            prop_assert_eq!(a.direction.flipped(), b.direction);
        }
    }
}
