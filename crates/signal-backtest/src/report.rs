//! Backtest report generation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::Trade;

/// Aggregate statistics and the full trade list of a backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Bars carrying a buy or sell
    pub total_signals: usize,
    pub total_trades: usize,
    /// Winning trades as a percentage of all trades
    pub win_rate: f64,
    /// Mean trade return in percent
    pub avg_return: f64,
    /// Worst per-trade drawdown in percent (≤ 0)
    pub max_drawdown: f64,
    pub trades: Vec<Trade>,
}

impl BacktestReport {
    /// Report for a run without any signals.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_trades(total_signals: usize, trades: Vec<Trade>) -> Self {
        if trades.is_empty() {
            return Self {
                total_signals,
                ..Self::default()
            };
        }

        let count = trades.len() as f64;
        let wins = trades.iter().filter(|t| t.is_win()).count() as f64;
        let avg_return = trades.iter().map(|t| t.return_pct).sum::<f64>() / count;
        let max_drawdown = trades
            .iter()
            .map(|t| t.max_drawdown_pct)
            .fold(0.0, f64::min);

        Self {
            total_signals,
            total_trades: trades.len(),
            win_rate: wins / count * 100.0,
            avg_return,
            max_drawdown,
            trades,
        }
    }

    /// Trades that exited within the last `months` (30-day months) before `now`.
    pub fn recent_trades(&self, now: DateTime<Utc>, months: u32) -> Vec<&Trade> {
        let cutoff = now - Duration::days(i64::from(months) * 30);
        self.trades
            .iter()
            .filter(|t| t.exit_date >= cutoff)
            .collect()
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Total Signals:       {}\n", self.total_signals));
        s.push_str(&format!("  Total Trades:        {}\n", self.total_trades));
        s.push_str(&format!("  Win Rate:            {:.1}%\n", self.win_rate));
        s.push_str(&format!("  Avg Return:          {:+.2}%\n", self.avg_return));
        s.push_str(&format!("  Max Drawdown:        {:.2}%\n", self.max_drawdown));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Render `trades` as a fixed-width table.
    pub fn trades_table(trades: &[&Trade]) -> String {
        let mut s = String::new();
        let rule = "─".repeat(88);

        s.push_str(&format!(
            "{:<12} {:<12} {:>10} {:>10} {:>10} {:>10} {:>9} {:<6}\n",
            "Entry", "Exit", "Entry Px", "Exit Px", "High", "Low", "Return", "Result"
        ));
        s.push_str(&rule);
        s.push('\n');

        for trade in trades {
            let result = match (trade.is_win(), trade.forced_exit) {
                (true, false) => "win",
                (false, false) => "loss",
                (true, true) => "win*",
                (false, true) => "loss*",
            };
            s.push_str(&format!(
                "{:<12} {:<12} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>+8.2}% {:<6}\n",
                trade.entry_date.format("%Y-%m-%d"),
                trade.exit_date.format("%Y-%m-%d"),
                trade.entry_price,
                trade.exit_price,
                trade.high_during_hold,
                trade.low_during_hold,
                trade.return_pct,
                result
            ));
        }

        s.push_str(&rule);
        s.push('\n');
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
