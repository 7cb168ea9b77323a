//! Logging setup.

use signal_core::error::SignalError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Keeps the background log-file writer alive. Drop it last.
pub struct LogGuard(Option<WorkerGuard>);

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level`. When `file` is set, JSON records are also
/// appended to a daily-rolling file next to it (`<file>.YYYY-MM-DD`).
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Result<LogGuard, SignalError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SignalError::Config(format!("invalid log level {:?}: {}", level, e)))?;

    let mut layers = Vec::new();
    if json {
        layers.push(fmt::layer().json().boxed());
    } else {
        layers.push(fmt::layer().pretty().boxed());
    }

    let mut guard = None;
    if let Some(path) = file {
        let file_name = path
            .file_name()
            .ok_or_else(|| SignalError::Config(format!("invalid log file: {}", path.display())))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
        guard = Some(worker);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| SignalError::Config(format!("logging already initialised: {}", e)))?;

    Ok(LogGuard(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(
            setup_logging("quant_signal=verbose", false, None),
            Err(SignalError::Config(_))
        ));
    }
}
