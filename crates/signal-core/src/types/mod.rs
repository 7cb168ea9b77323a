//! Core data types for the signal desk.

mod ohlcv;
mod position;
mod signal;
mod timeframe;

pub use ohlcv::{Bar, BarSeries};
pub use position::{Position, PositionStatus, Side};
pub use signal::{
    ConsensusSignal, Crossover, DetectorBreakdown, DetectorDetail, DetectorSignal, Direction,
    SignalLevel, Trend, VoteCount, Zone,
};
pub use timeframe::Timeframe;
