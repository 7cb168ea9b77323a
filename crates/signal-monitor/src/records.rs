//! Structured signal and position records.
//!
//! These are the payloads handed to notifiers and the log lines an operator
//! greps for. Sending notifications is left to the consumer of
//! [`SignalRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::types::{ConsensusSignal, Direction, SignalLevel, VoteCount};
use signal_ledger::LedgerEvent;
use tracing::{info, warn};

/// Flattened consensus verdict for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub instrument: String,
    pub time: Option<DateTime<Utc>>,
    pub price: f64,
    pub direction: Direction,
    pub level: SignalLevel,
    pub strength: f64,
    pub label: String,
    pub votes: VoteCount,
    /// Per-detector labels, e.g. `ema: buy`
    pub detectors: Vec<String>,
    /// Whether the level clears the notification threshold
    pub notify: bool,
}

impl SignalRecord {
    pub fn new(instrument: &str, signal: &ConsensusSignal, min_level: SignalLevel) -> Self {
        let b = &signal.breakdown;
        Self {
            instrument: instrument.to_string(),
            time: DateTime::from_timestamp_millis(signal.timestamp),
            price: signal.price,
            direction: signal.direction,
            level: signal.level,
            strength: signal.strength,
            label: signal.label.clone(),
            votes: signal.votes,
            detectors: vec![
                format!("ema: {}", b.ema.label),
                format!("macd: {}", b.macd.label),
                format!("kdj: {}", b.kdj.label),
            ],
            notify: signal.should_notify(min_level),
        }
    }

    /// Multi-line text for a notification body.
    pub fn message(&self) -> String {
        let mut s = format!(
            "{} {} ({} level, strength {:.2})\nprice: {:.4}\n",
            self.instrument, self.label, self.level, self.strength, self.price
        );
        if let Some(time) = self.time {
            s.push_str(&format!("bar: {}\n", time.format("%Y-%m-%d %H:%M UTC")));
        }
        s.push_str(&format!(
            "votes: {} buy / {} sell of {}\n",
            self.votes.buy_count, self.votes.sell_count, self.votes.total_indicators
        ));
        for detector in &self.detectors {
            s.push_str(&format!("  {}\n", detector));
        }
        s
    }
}

/// Log a consensus verdict and return its record.
pub fn log_signal(instrument: &str, signal: &ConsensusSignal, min_level: SignalLevel) -> SignalRecord {
    let record = SignalRecord::new(instrument, signal, min_level);
    info!(
        instrument,
        direction = %record.direction,
        level = %record.level,
        strength = record.strength,
        label = %record.label,
        price = record.price,
        buy_count = record.votes.buy_count,
        sell_count = record.votes.sell_count,
        notify = record.notify,
        "Signal"
    );
    record
}

/// Log a ledger event.
pub fn log_event(event: &LedgerEvent) {
    let p = event.position();
    match event {
        LedgerEvent::Opened(_) => info!(
            event = "open",
            instrument = %p.instrument,
            id = %p.id,
            entry_price = p.entry_price,
            strength = p.strength_at_entry,
            "{}",
            event.summary()
        ),
        LedgerEvent::Closed(_) => info!(
            event = "close",
            instrument = %p.instrument,
            id = %p.id,
            exit_price = p.exit_price,
            profit_loss = p.profit_loss,
            profit_loss_pct = p.profit_loss_pct,
            "{}",
            event.summary()
        ),
        LedgerEvent::ForcedClosed(_) => warn!(
            event = "forced_close",
            instrument = %p.instrument,
            id = %p.id,
            exit_price = p.exit_price,
            profit_loss = p.profit_loss,
            profit_loss_pct = p.profit_loss_pct,
            "{}",
            event.summary()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::types::DetectorSignal;

    fn signal() -> ConsensusSignal {
        let mut signal = ConsensusSignal {
            direction: Direction::Buy,
            strength: 0.72,
            level: SignalLevel::Medium,
            label: "buy".into(),
            votes: VoteCount {
                buy_count: 2,
                sell_count: 0,
                total_indicators: 3,
            },
            timestamp: 1_705_276_800_000,
            price: 5.5,
            ..ConsensusSignal::empty()
        };
        signal.breakdown.ema = DetectorSignal {
            direction: Direction::Buy,
            strength: 0.9,
            label: "buy".into(),
            ..DetectorSignal::none()
        };
        signal
    }

    #[test]
    fn test_record_notify_gate() {
        assert!(SignalRecord::new("AR/USDT", &signal(), SignalLevel::Medium).notify);
        assert!(!SignalRecord::new("AR/USDT", &signal(), SignalLevel::Strong).notify);
    }

    #[test]
    fn test_record_message() {
        let record = SignalRecord::new("AR/USDT", &signal(), SignalLevel::Medium);
        let message = record.message();

        assert!(message.starts_with("AR/USDT buy (medium level, strength 0.72)"));
        assert!(message.contains("bar: 2024-01-15 00:00 UTC"));
        assert!(message.contains("votes: 2 buy / 0 sell of 3"));
        assert!(message.contains("  ema: buy"));
        assert!(message.contains("  kdj: none"));
    }

    #[test]
    fn test_record_serializes() {
        let record = SignalRecord::new("AR/USDT", &signal(), SignalLevel::Weak);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["direction"], "buy");
        assert_eq!(json["level"], "medium");
        assert_eq!(json["notify"], true);
    }
}
