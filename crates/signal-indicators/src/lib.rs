//! Technical indicators with SIMD optimization.
//!
//! This crate provides the indicator columns the detectors and the chart
//! export work from:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, KDJ)
//! - Volatility indicators (Bollinger Bands, Standard Deviation)
//!
//! Every indicator returns a series aligned with its input, with `NaN`
//! before the warm-up. [`IndicatorEngine`] bundles them into an
//! [`AnnotatedSeries`] with per-bar rule markers.

pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod volatility;

pub use engine::{AnnotatedSeries, EngineConfig, IndicatorEngine, SignalMarker};
pub use momentum::{Kdj, KdjOutput, Macd, MacdOutput, Rsi};
pub use moving_average::{Ema, Sma};
pub use volatility::{BollingerBands, BollingerOutput, StdDev};
