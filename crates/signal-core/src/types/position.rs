//! Positions tracked by the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SignalLevel;

/// Side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Long => "long",
            Side::Short => "short",
        })
    }
}

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closed,
    /// Closed by the ledger after exceeding the maximum holding period.
    ForcedClosed,
}

/// A real (non-simulated) position in one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique per open
    pub id: String,
    pub instrument: String,
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Consensus strength when the position was opened
    pub strength_at_entry: f64,
    /// Consensus level when the position was opened
    pub level_at_entry: SignalLevel,
    pub status: PositionStatus,
    pub profit_loss: Option<f64>,
    pub profit_loss_pct: Option<f64>,
    pub holding_days: Option<i64>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Signed profit per unit at `price`: long gains when price rises, short when it falls.
    pub fn pnl_at(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        }
    }

    /// Whole days elapsed between entry and `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.entry_time).num_days()
    }
}
