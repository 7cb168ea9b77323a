//! Backtesting engine.
//!
//! Replays a per-bar direction sequence against a bar series, holding at
//! most one long position at a time, and summarises the resulting trades.

mod engine;
mod report;

pub use engine::{Backtester, Outcome, Trade};
pub use report::BacktestReport;
