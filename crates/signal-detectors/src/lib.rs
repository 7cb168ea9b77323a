//! Signal detectors and consensus aggregation.
//!
//! Each detector turns one indicator family into a per-bar verdict:
//! - EMA fast/slow crossover
//! - MACD histogram sign change
//! - KDJ K/D crossover with overbought/oversold zones
//!
//! The [`ConsensusAggregator`] votes across all three and assigns a level.

mod consensus;
mod cross;
mod ema;
mod kdj;
mod macd;

pub use consensus::{ConsensusAggregator, ConsensusConfig};
pub use ema::{EmaDetector, EmaDetectorConfig};
pub use kdj::{KdjDetector, KdjDetectorConfig};
pub use macd::{MacdDetector, MacdDetectorConfig};
