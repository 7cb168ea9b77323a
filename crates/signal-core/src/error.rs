//! Error types for the signal desk.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Bar source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Bars out of order at index {index}: {timestamp} <= {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: i64,
        previous: i64,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Position ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Position already open for {instrument}: {id}")]
    AlreadyOpen { instrument: String, id: String },

    #[error("No open position {id} for {instrument}")]
    PositionNotFound { instrument: String, id: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Failed to read position store {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist position store to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}
