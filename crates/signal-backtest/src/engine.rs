//! Backtesting engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::types::{Bar, BarSeries, ConsensusSignal, Direction};
use signal_indicators::AnnotatedSeries;
use tracing::{debug, info};

use crate::report::BacktestReport;

/// Result of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// Record of a single round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: DateTime<Utc>,
    pub exit_date: DateTime<Utc>,
    /// Bar index of the entry
    pub entry_index: usize,
    /// Bar index of the exit
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Highest high over the holding window, entry and exit bars included
    pub high_during_hold: f64,
    /// Lowest low over the holding window, entry and exit bars included
    pub low_during_hold: f64,
    pub return_pct: f64,
    /// Best unrealised gain over the hold, never negative
    pub max_runup_pct: f64,
    /// Worst unrealised loss over the hold, never positive
    pub max_drawdown_pct: f64,
    pub outcome: Outcome,
    /// Closed at the end of the data rather than by a sell signal
    pub forced_exit: bool,
}

impl Trade {
    fn close(bars: &[Bar], entry_index: usize, exit_index: usize, forced_exit: bool) -> Self {
        let entry = &bars[entry_index];
        let exit = &bars[exit_index];
        let window = &bars[entry_index..=exit_index];

        let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let pct = |price: f64| {
            if entry.close != 0.0 {
                (price - entry.close) / entry.close * 100.0
            } else {
                0.0
            }
        };
        let return_pct = pct(exit.close);

        Self {
            entry_date: entry.datetime(),
            exit_date: exit.datetime(),
            entry_index,
            exit_index,
            entry_price: entry.close,
            exit_price: exit.close,
            high_during_hold: high,
            low_during_hold: low,
            return_pct,
            max_runup_pct: pct(high).max(0.0),
            max_drawdown_pct: pct(low).min(0.0),
            outcome: if return_pct > 0.0 {
                Outcome::Win
            } else {
                Outcome::Loss
            },
            forced_exit,
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

/// Long-only, single-position signal replay.
///
/// A buy while flat opens at the bar close, a sell while holding closes at
/// the bar close, and every other combination is ignored. A position still
/// open at the end of the data is closed at the final close.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtester;

impl Backtester {
    pub fn new() -> Self {
        Self
    }

    /// Run over `directions`, aligned with the bars of `series`.
    ///
    /// Only the common prefix of the two inputs is replayed.
    pub fn run(&self, series: &BarSeries, directions: &[Direction]) -> BacktestReport {
        self.simulate(&series.symbol, series.as_slice(), directions)
    }

    /// Run the rule markers of an annotated series.
    pub fn run_annotated(&self, annotated: &AnnotatedSeries) -> BacktestReport {
        self.simulate(&annotated.symbol, &annotated.bars, &annotated.directions())
    }

    /// Run per-bar consensus signals, as produced by
    /// `ConsensusAggregator::evaluate_series`.
    pub fn run_consensus(&self, series: &BarSeries, signals: &[ConsensusSignal]) -> BacktestReport {
        let directions: Vec<Direction> = signals.iter().map(|s| s.direction).collect();
        self.run(series, &directions)
    }

    fn simulate(&self, symbol: &str, bars: &[Bar], directions: &[Direction]) -> BacktestReport {
        let len = bars.len().min(directions.len());
        let bars = &bars[..len];
        let directions = &directions[..len];

        let total_signals = directions.iter().filter(|d| !d.is_none()).count();
        if total_signals == 0 {
            debug!(symbol, bars = len, "No signals to backtest");
            return BacktestReport::empty();
        }

        let mut trades = Vec::new();
        let mut entry: Option<usize> = None;

        for (i, direction) in directions.iter().enumerate() {
            match (direction, entry) {
                (Direction::Buy, None) => {
                    debug!(symbol, index = i, price = bars[i].close, "Backtest entry");
                    entry = Some(i);
                }
                (Direction::Sell, Some(entry_index)) => {
                    let trade = Trade::close(bars, entry_index, i, false);
                    debug!(
                        symbol,
                        index = i,
                        return_pct = trade.return_pct,
                        "Backtest exit"
                    );
                    trades.push(trade);
                    entry = None;
                }
                _ => {}
            }
        }

        if let Some(entry_index) = entry {
            trades.push(Trade::close(bars, entry_index, len - 1, true));
        }

        let report = BacktestReport::from_trades(total_signals, trades);
        info!(
            symbol,
            signals = report.total_signals,
            trades = report.total_trades,
            win_rate = report.win_rate,
            avg_return = report.avg_return,
            "Backtest complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::types::Timeframe;
    use signal_indicators::IndicatorEngine;
    use Direction::{Buy, None as Hold, Sell};

    const DAY_MS: i64 = 86_400_000;

    fn series(closes: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST", Timeframe::Daily);
        series.extend(closes.iter().enumerate().map(|(i, &c)| {
            Bar::new(i as i64 * DAY_MS, c, c + 1.0, c - 1.0, c, 1_000.0)
        }));
        series
    }

    #[test]
    fn test_round_trip() {
        let s = series(&[10.0, 11.0, 13.0, 12.0]);
        let report = Backtester::new().run(&s, &[Buy, Hold, Hold, Sell]);

        assert_eq!(report.total_signals, 2);
        assert_eq!(report.total_trades, 1);

        let trade = &report.trades[0];
        assert_eq!(trade.entry_price, 10.0);
        assert_eq!(trade.exit_price, 12.0);
        assert!((trade.return_pct - 20.0).abs() < 1e-10);
        // High 14 over the window, low 9 on the entry bar
        assert!((trade.max_runup_pct - 40.0).abs() < 1e-10);
        assert!((trade.max_drawdown_pct + 10.0).abs() < 1e-10);
        assert_eq!(trade.outcome, Outcome::Win);
        assert!(!trade.forced_exit);
        assert_eq!(trade.exit_date.timestamp_millis(), 3 * DAY_MS);
    }

    #[test]
    fn test_repeated_buys_and_stray_sells_are_ignored() {
        let s = series(&[10.0, 9.0, 8.0, 9.0, 10.0, 11.0]);
        let report = Backtester::new().run(&s, &[Sell, Buy, Buy, Hold, Sell, Sell]);

        assert_eq!(report.total_signals, 5);
        assert_eq!(report.total_trades, 1);
        assert_eq!(report.trades[0].entry_index, 1);
        assert_eq!(report.trades[0].exit_index, 4);
    }

    #[test]
    fn test_single_buy_is_force_closed() {
        let s = series(&[10.0, 10.5, 9.0, 9.5]);
        let report = Backtester::new().run(&s, &[Hold, Buy, Hold, Hold]);

        assert_eq!(report.total_trades, 1);
        let trade = &report.trades[0];
        assert!(trade.forced_exit);
        assert_eq!(trade.exit_price, 9.5);
        assert_eq!(trade.exit_index, 3);
        assert_eq!(trade.outcome, Outcome::Loss);
    }

    #[test]
    fn test_zero_return_is_loss() {
        let s = series(&[10.0, 12.0, 10.0]);
        let report = Backtester::new().run(&s, &[Buy, Hold, Sell]);

        assert_eq!(report.trades[0].return_pct, 0.0);
        assert_eq!(report.trades[0].outcome, Outcome::Loss);
        assert_eq!(report.win_rate, 0.0);
    }

    #[test]
    fn test_no_signals_is_empty_report() {
        let s = series(&[10.0, 11.0, 12.0]);
        let report = Backtester::new().run(&s, &[Hold, Hold, Hold]);

        assert_eq!(report, BacktestReport::empty());
        assert_eq!(Backtester::new().run(&series(&[]), &[]), BacktestReport::empty());
    }

    #[test]
    fn test_mismatched_lengths_use_common_prefix() {
        let s = series(&[10.0, 11.0, 12.0]);
        let report = Backtester::new().run(&s, &[Buy, Hold, Hold, Sell, Buy]);

        assert_eq!(report.total_signals, 1);
        assert!(report.trades[0].forced_exit);
        assert_eq!(report.trades[0].exit_index, 2);
    }

    #[test]
    fn test_run_annotated_breakout() {
        let mut closes = vec![10.0; 60];
        closes.extend([12.0; 5]);
        let annotated = IndicatorEngine::default().annotate(&series(&closes));
        let report = Backtester::new().run_annotated(&annotated);

        assert_eq!(report.total_signals, 1);
        assert_eq!(report.total_trades, 1);
        assert_eq!(report.trades[0].entry_index, 60);
        assert!(report.trades[0].forced_exit);
    }

    #[test]
    fn test_run_consensus_uses_signal_directions() {
        let s = series(&[10.0, 11.0, 12.0]);
        let signals: Vec<ConsensusSignal> = [Buy, Hold, Sell]
            .into_iter()
            .map(|direction| ConsensusSignal {
                direction,
                ..ConsensusSignal::empty()
            })
            .collect();
        let report = Backtester::new().run_consensus(&s, &signals);

        assert_eq!(report.total_trades, 1);
        assert!((report.trades[0].return_pct - 20.0).abs() < 1e-10);
    }
}
