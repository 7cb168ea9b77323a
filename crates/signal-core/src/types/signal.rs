//! Detector and consensus signal records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction a signal points in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    #[default]
    None,
}

impl Direction {
    /// Chart marker value: 1 for buy, -1 for sell, 0 otherwise.
    pub fn as_marker(&self) -> i8 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
            Direction::None => 0,
        }
    }

    /// The opposite direction; `None` stays `None`.
    pub fn flipped(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
            Direction::None => Direction::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Direction::None)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::None => "none",
        })
    }
}

/// Consensus signal level. Ordered so that `Strong > Medium > Weak > None`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SignalLevel {
    #[default]
    None,
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalLevel::None => "none",
            SignalLevel::Weak => "weak",
            SignalLevel::Medium => "medium",
            SignalLevel::Strong => "strong",
        })
    }
}

impl std::str::FromStr for SignalLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SignalLevel::None),
            "weak" => Ok(SignalLevel::Weak),
            "medium" => Ok(SignalLevel::Medium),
            "strong" => Ok(SignalLevel::Strong),
            _ => Err(format!("Invalid signal level: {}", s)),
        }
    }
}

/// Which way two lines crossed on the evaluated bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// Fast line (or histogram) crossed upward.
    Up,
    /// Fast line (or histogram) crossed downward.
    Down,
}

/// Trend bias reported when no crossover happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
}

/// Stochastic zone membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Oversold,
    Overbought,
    #[default]
    Neutral,
}

/// Indicator values backing a detector's verdict, one fixed shape per detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "detector", rename_all = "snake_case")]
pub enum DetectorDetail {
    /// Not enough bars to evaluate.
    #[default]
    Empty,
    Ema {
        ema_fast: f64,
        ema_slow: f64,
        crossover: Option<Crossover>,
        trend: Option<Trend>,
        price: f64,
    },
    Macd {
        macd: f64,
        signal: f64,
        histogram: f64,
        crossover: Option<Crossover>,
        trend: Option<Trend>,
        price: f64,
    },
    Kdj {
        k: f64,
        d: f64,
        j: f64,
        crossover: Option<Crossover>,
        zone: Zone,
        price: f64,
    },
}

/// Single-bar verdict of one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectorSignal {
    pub direction: Direction,
    /// Confidence in [0, 1]
    pub strength: f64,
    pub label: String,
    pub detail: DetectorDetail,
}

impl DetectorSignal {
    /// The "insufficient data" verdict.
    pub fn none() -> Self {
        Self {
            direction: Direction::None,
            strength: 0.0,
            label: "none".to_string(),
            detail: DetectorDetail::Empty,
        }
    }

    pub fn is_directional(&self) -> bool {
        !self.direction.is_none()
    }
}

/// Per-detector results feeding a consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectorBreakdown {
    pub ema: DetectorSignal,
    pub macd: DetectorSignal,
    pub kdj: DetectorSignal,
}

impl DetectorBreakdown {
    pub fn iter(&self) -> impl Iterator<Item = &DetectorSignal> {
        [&self.ema, &self.macd, &self.kdj].into_iter()
    }
}

/// Vote tally behind a consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoteCount {
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_indicators: usize,
}

/// Leveled signal combining all detectors for the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsensusSignal {
    pub direction: Direction,
    /// Mean of the detector strengths
    pub strength: f64,
    pub level: SignalLevel,
    pub label: String,
    pub breakdown: DetectorBreakdown,
    pub votes: VoteCount,
    /// Unix timestamp in milliseconds of the evaluated bar
    pub timestamp: i64,
    /// Close of the evaluated bar
    pub price: f64,
}

impl ConsensusSignal {
    /// Signal returned for an empty bar series.
    pub fn empty() -> Self {
        Self {
            label: "none".to_string(),
            breakdown: DetectorBreakdown {
                ema: DetectorSignal::none(),
                macd: DetectorSignal::none(),
                kdj: DetectorSignal::none(),
            },
            ..Default::default()
        }
    }

    /// Whether this signal clears the minimum notification level.
    pub fn should_notify(&self, min_level: SignalLevel) -> bool {
        if self.direction.is_none() {
            return false;
        }
        self.level >= min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(SignalLevel::Strong > SignalLevel::Medium);
        assert!(SignalLevel::Medium > SignalLevel::Weak);
        assert!(SignalLevel::Weak > SignalLevel::None);
        assert_eq!("Medium".parse::<SignalLevel>().unwrap(), SignalLevel::Medium);
    }

    #[test]
    fn test_should_notify() {
        let mut signal = ConsensusSignal {
            direction: Direction::Buy,
            level: SignalLevel::Medium,
            ..ConsensusSignal::empty()
        };
        assert!(signal.should_notify(SignalLevel::Medium));
        assert!(signal.should_notify(SignalLevel::Weak));
        assert!(!signal.should_notify(SignalLevel::Strong));

        signal.direction = Direction::None;
        assert!(!signal.should_notify(SignalLevel::None));
    }

    #[test]
    fn test_detail_serializes_tagged() {
        let detail = DetectorDetail::Kdj {
            k: 15.0,
            d: 12.0,
            j: 21.0,
            crossover: Some(Crossover::Up),
            zone: Zone::Oversold,
            price: 5.5,
        };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["detector"], "kdj");
        assert_eq!(json["crossover"], "up");
        assert_eq!(json["zone"], "oversold");
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Buy.flipped(), Direction::Sell);
        assert_eq!(Direction::None.flipped(), Direction::None);
        assert_eq!(Direction::Sell.as_marker(), -1);
        assert_eq!(Direction::Buy.to_string(), "buy");
    }
}
