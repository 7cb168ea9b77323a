//! Bar intervals.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval covered by one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    /// Signal evaluation runs on 4h bars by default.
    #[serde(rename = "4h")]
    #[default]
    Hour4,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
}

impl Timeframe {
    /// Length of one bar.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::Minute15 => Duration::minutes(15),
            Timeframe::Hour1 => Duration::hours(1),
            Timeframe::Hour4 => Duration::hours(4),
            Timeframe::Daily => Duration::days(1),
            Timeframe::Weekly => Duration::weeks(1),
        }
    }

    /// How many bars of this interval fit in `days` calendar days (at least one).
    pub fn bars_in_days(&self, days: i64) -> usize {
        let per_bar = self.duration().num_minutes().max(1);
        (days.saturating_mul(24 * 60) / per_bar).max(1) as usize
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
        };
        f.write_str(s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exchange APIs spell these with upper-case units ("4H", "1D").
        match s.to_ascii_lowercase().as_str() {
            "15m" | "15min" => Ok(Timeframe::Minute15),
            "1h" | "60m" => Ok(Timeframe::Hour1),
            "4h" | "240m" => Ok(Timeframe::Hour4),
            "1d" | "daily" => Ok(Timeframe::Daily),
            "1w" | "weekly" => Ok(Timeframe::Weekly),
            _ => Err(format!("Invalid interval: {}", s)),
        }
    }
}
