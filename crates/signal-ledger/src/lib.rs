//! Position ledger.
//!
//! Tracks real positions per instrument, persists every change through a
//! [`PositionStore`], and force-closes positions held past the configured
//! number of days. [`advance`] drives the ledger from consensus signals.

mod advance;
mod ledger;
mod store;

pub use advance::{advance, advance_at, LedgerEvent};
pub use ledger::{LedgerStatistics, PositionLedger};
pub use store::{JsonFileStore, MemoryStore, PositionBook, PositionStore};
