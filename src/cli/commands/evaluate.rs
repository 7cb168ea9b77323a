//! Evaluate command implementation.

use anyhow::{Context, Result};
use serde_json::json;
use signal_config::AppConfig;
use signal_core::traits::BarSource;
use signal_detectors::ConsensusAggregator;
use signal_ledger::{advance, LedgerEvent, PositionLedger, PositionStore};
use signal_monitor::{log_event, log_signal, SignalRecord};
use tracing::info;

use super::{bar_source, open_ledger};
use crate::cli::{symbols_or_default, EvaluateArgs, OutputFormat};

/// Outcome of checking one symbol.
pub struct Check {
    pub record: SignalRecord,
    pub events: Vec<LedgerEvent>,
}

pub async fn run(args: EvaluateArgs, config: &AppConfig) -> Result<()> {
    let aggregator = ConsensusAggregator::new(config.consensus())?;
    let source = bar_source(args.data.as_deref(), config);
    let mut ledger = args.apply.then(|| open_ledger(config));
    let symbols = symbols_or_default(&args.symbols, config);

    info!(symbols = ?symbols, apply = args.apply, "Evaluating signals");

    let mut checks = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let check = check_symbol(&source, &aggregator, ledger.as_mut(), symbol, config)
            .await
            .with_context(|| format!("Failed to evaluate {}", symbol))?;
        checks.push(check);
    }

    match args.output {
        OutputFormat::Json => {
            let out: Vec<_> = checks
                .iter()
                .map(|c| {
                    json!({
                        "signal": c.record,
                        "events": c.events.iter().map(LedgerEvent::summary).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for check in &checks {
                print!("{}", check.record.message());
                if check.record.notify {
                    println!("  -> notify");
                }
                for event in &check.events {
                    println!("  {}", event.summary());
                }
                println!();
            }
        }
    }

    Ok(())
}

/// Fetch bars for `symbol`, evaluate the consensus and, given a ledger, apply it.
pub async fn check_symbol<B, S>(
    source: &B,
    aggregator: &ConsensusAggregator,
    ledger: Option<&mut PositionLedger<S>>,
    symbol: &str,
    config: &AppConfig,
) -> Result<Check>
where
    B: BarSource,
    S: PositionStore,
{
    let series = source
        .get_bars(symbol, config.data.timeframe, config.data.limit)
        .await?;

    let signal = aggregator.evaluate(&series);
    let record = log_signal(symbol, &signal, config.notify.min_level);

    let events = match ledger {
        Some(ledger) => advance(ledger, symbol, &signal)?,
        None => Vec::new(),
    };
    events.iter().for_each(log_event);

    Ok(Check { record, events })
}
