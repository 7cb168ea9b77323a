//! Logging setup and structured signal records.

mod logging;
mod records;

pub use logging::{setup_logging, LogGuard};
pub use records::{log_event, log_signal, SignalRecord};
