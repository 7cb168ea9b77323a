//! Applying consensus signals to the ledger.

use chrono::{DateTime, Utc};
use signal_core::error::LedgerError;
use signal_core::types::{ConsensusSignal, Direction, Position, Side};

use crate::ledger::PositionLedger;
use crate::store::PositionStore;

/// What a signal did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    Opened(Position),
    Closed(Position),
    /// Closed for exceeding the maximum holding period
    ForcedClosed(Position),
}

impl LedgerEvent {
    pub fn position(&self) -> &Position {
        match self {
            LedgerEvent::Opened(p) | LedgerEvent::Closed(p) | LedgerEvent::ForcedClosed(p) => p,
        }
    }

    /// One-line, human-readable description.
    pub fn summary(&self) -> String {
        let p = self.position();
        match self {
            LedgerEvent::Opened(_) => format!(
                "{} opened {} @ {:.4} (strength {:.2}, {})",
                p.instrument, p.side, p.entry_price, p.strength_at_entry, p.level_at_entry
            ),
            LedgerEvent::Closed(_) | LedgerEvent::ForcedClosed(_) => {
                let verb = if matches!(self, LedgerEvent::ForcedClosed(_)) {
                    "force-closed"
                } else {
                    "closed"
                };
                format!(
                    "{} {} {}: entry {:.4}, exit {:.4}, P&L {:.2} ({:+.2}%), held {} days",
                    p.instrument,
                    verb,
                    p.side,
                    p.entry_price,
                    p.exit_price.unwrap_or(f64::NAN),
                    p.profit_loss.unwrap_or(0.0),
                    p.profit_loss_pct.unwrap_or(0.0),
                    p.holding_days.unwrap_or(0)
                )
            }
        }
    }
}

pub fn advance<S: PositionStore>(
    ledger: &mut PositionLedger<S>,
    instrument: &str,
    signal: &ConsensusSignal,
) -> Result<Vec<LedgerEvent>, LedgerError> {
    advance_at(ledger, instrument, signal, Utc::now())
}

/// Apply `signal` to the ledger at its close price.
///
/// Expired positions are force-closed first. A buy then opens a long when
/// nothing is open, and a sell closes everything that is. Other signals leave
/// the ledger untouched, as does a signal computed from an empty series.
pub fn advance_at<S: PositionStore>(
    ledger: &mut PositionLedger<S>,
    instrument: &str,
    signal: &ConsensusSignal,
    now: DateTime<Utc>,
) -> Result<Vec<LedgerEvent>, LedgerError> {
    let price = signal.price;
    // No bar behind the signal
    if !(price.is_finite() && price > 0.0) {
        return Ok(Vec::new());
    }

    let mut events: Vec<LedgerEvent> = ledger
        .check_forced_close_at(instrument, price, now)?
        .into_iter()
        .map(LedgerEvent::ForcedClosed)
        .collect();

    let holding = !ledger.open_positions(Some(instrument)).is_empty();
    match signal.direction {
        Direction::Buy if !holding => {
            let position = ledger.open_position_at(
                instrument,
                Side::Long,
                price,
                signal.strength,
                signal.level,
                now,
            )?;
            events.push(LedgerEvent::Opened(position));
        }
        Direction::Sell if holding => {
            let closed = ledger.close_position_at(instrument, price, None, false, now)?;
            events.extend(closed.into_iter().map(LedgerEvent::Closed));
        }
        _ => {}
    }

    Ok(events)
}
