//! Property tests for backtest invariants.
//!
//! Uses proptest to verify:
//! 1. Single position: trades never overlap, so open minus closed is 0 or 1
//! 2. Outcome consistency: a trade wins exactly when its return is positive
//! 3. Excursions bracket zero and the report aggregates match the trades
//! 4. Replaying consensus output never breaks the above

use proptest::prelude::*;
use signal_backtest::{Backtester, Outcome};
use signal_core::types::{Bar, BarSeries, Direction, Timeframe};
use signal_detectors::ConsensusAggregator;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        3 => Just(Direction::None),
        1 => Just(Direction::Buy),
        1 => Just(Direction::Sell),
    ]
}

/// Bars with whole-cent closes and a high/low band around each close.
fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-300i32..=300, 0u32..=200), 0..max_len).prop_map(|steps| {
        let mut price = 50.0_f64;
        steps
            .into_iter()
            .map(|(step, band)| {
                price = (price + step as f64 / 100.0).max(1.0);
                (price, band as f64 / 100.0)
            })
            .collect()
    })
}

fn to_series(bars: &[(f64, f64)]) -> BarSeries {
    let mut series = BarSeries::new("PROP", Timeframe::Daily);
    series.extend(bars.iter().enumerate().map(|(i, &(close, band))| {
        Bar::new(i as i64 * 86_400_000, close, close + band, close - band, close, 1.0)
    }));
    series
}

// ── 1–3. Direct replay ───────────────────────────────────────────────

proptest! {
    #[test]
    fn single_position_and_outcomes(
        bars in arb_bars(120),
        directions in prop::collection::vec(arb_direction(), 0..120),
    ) {
        let series = to_series(&bars);
        let report = Backtester::new().run(&series, &directions);
        let len = bars.len().min(directions.len());

        // Trades are ordered and disjoint
        for pair in report.trades.windows(2) {
            prop_assert!(pair[0].exit_index < pair[1].entry_index);
        }

        for (i, trade) in report.trades.iter().enumerate() {
            prop_assert!(trade.entry_index <= trade.exit_index);
            prop_assert_eq!(trade.outcome == Outcome::Win, trade.return_pct > 0.0);
            prop_assert!(trade.max_drawdown_pct <= 0.0);
            prop_assert!(trade.max_runup_pct >= 0.0);
            prop_assert!(trade.low_during_hold <= trade.entry_price.min(trade.exit_price));
            prop_assert!(trade.high_during_hold >= trade.entry_price.max(trade.exit_price));

            // Only the last trade may be closed by the end of the data
            if trade.forced_exit {
                prop_assert_eq!(i, report.trades.len() - 1);
                prop_assert_eq!(trade.exit_index, len - 1);
            } else {
                prop_assert_eq!(directions[trade.exit_index], Direction::Sell);
            }
            prop_assert_eq!(directions[trade.entry_index], Direction::Buy);
        }

        let signals = directions[..len].iter().filter(|d| !d.is_none()).count();
        prop_assert_eq!(report.total_signals, signals);
        prop_assert_eq!(report.total_trades, report.trades.len());

        if report.trades.is_empty() {
            prop_assert_eq!(report.win_rate, 0.0);
            prop_assert_eq!(report.avg_return, 0.0);
            prop_assert_eq!(report.max_drawdown, 0.0);
        } else {
            let wins = report.trades.iter().filter(|t| t.is_win()).count() as f64;
            let expected = wins / report.trades.len() as f64 * 100.0;
            prop_assert!((report.win_rate - expected).abs() < 1e-9);
            prop_assert!(report.trades.iter().all(|t| t.max_drawdown_pct >= report.max_drawdown));
        }
    }
}

// ── 4. Consensus replay ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn consensus_replay_holds_one_position(bars in arb_bars(150)) {
        let series = to_series(&bars);
        let signals = ConsensusAggregator::default().evaluate_series(&series);
        let report = Backtester::new().run_consensus(&series, &signals);

        for pair in report.trades.windows(2) {
            prop_assert!(pair[0].exit_index < pair[1].entry_index);
        }
        prop_assert!(report.trades.iter().filter(|t| t.forced_exit).count() <= 1);
    }
}
