//! Core types and traits for the signal desk.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Detector and consensus signal records
//! - Position records tracked by the ledger
//! - Core traits for indicators, detectors, and bar sources

pub mod types;
pub mod traits;
pub mod error;

pub use error::SignalError;
pub use types::*;
pub use traits::*;
