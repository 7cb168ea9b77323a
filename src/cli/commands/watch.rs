//! Watch command implementation.

use anyhow::Result;
use signal_config::AppConfig;
use signal_detectors::ConsensusAggregator;
use std::time::Duration;
use tracing::{error, info};

use super::evaluate::check_symbol;
use super::{bar_source, open_ledger};
use crate::cli::{symbols_or_default, WatchArgs};

/// Re-evaluate every symbol on a fixed interval until Ctrl-C.
///
/// Each tick re-reads the bar files, so an external fetcher only has to keep
/// them current. A failing symbol is logged and retried on the next tick.
pub async fn run(args: WatchArgs, config: &AppConfig) -> Result<()> {
    let aggregator = ConsensusAggregator::new(config.consensus())?;
    let source = bar_source(args.data.as_deref(), config);
    let mut ledger = open_ledger(config);
    let symbols = symbols_or_default(&args.symbols, config);
    let period = Duration::from_secs(args.interval.unwrap_or(config.data.interval_secs).max(1));

    info!(
        symbols = ?symbols,
        interval_secs = period.as_secs(),
        ledger = %config.ledger.path.display(),
        "Watching"
    );

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for symbol in &symbols {
                    match check_symbol(&source, &aggregator, Some(&mut ledger), symbol, config).await {
                        Ok(check) if check.record.notify => {
                            info!(instrument = %symbol, "Notification\n{}", check.record.message());
                        }
                        Ok(_) => {}
                        Err(e) => error!(instrument = %symbol, error = %e, "Check failed"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    let stats = ledger.statistics(None);
    info!(
        open = stats.open_trades,
        closed = stats.closed_trades,
        win_rate = stats.win_rate,
        "Watch stopped"
    );
    Ok(())
}
