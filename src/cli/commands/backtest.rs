//! Backtest command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use signal_backtest::{BacktestReport, Backtester};
use signal_config::AppConfig;
use signal_core::traits::BarSource;
use signal_detectors::ConsensusAggregator;
use signal_indicators::IndicatorEngine;
use std::fs::File;
use tracing::info;

use super::bar_source;
use crate::cli::{BacktestArgs, BacktestMode, OutputFormat};

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    let symbol = match &args.symbol {
        Some(symbol) => symbol.clone(),
        None => config
            .symbols
            .first()
            .cloned()
            .context("No symbol given and none configured")?,
    };

    let limit = match args.days {
        Some(days) if days > 0 => config.data.timeframe.bars_in_days(days),
        Some(_) => anyhow::bail!("--days must be positive"),
        None => 0,
    };

    let source = bar_source(args.data.as_deref(), config);
    let series = source
        .get_bars(&symbol, config.data.timeframe, limit)
        .await
        .with_context(|| format!("Failed to load bars for {}", symbol))?;

    info!(
        symbol = %symbol,
        bars = series.len(),
        source = source.name(),
        "Starting backtest"
    );

    let backtester = Backtester::new();
    let report = match args.mode {
        BacktestMode::Consensus => {
            let aggregator = ConsensusAggregator::new(config.consensus())?;
            let signals = aggregator.evaluate_series(&series);
            backtester.run_consensus(&series, &signals)
        }
        BacktestMode::Rules => {
            let annotated = IndicatorEngine::default().annotate(&series);
            backtester.run_annotated(&annotated)
        }
    };

    if let Some(chart_path) = &args.chart {
        let annotated = IndicatorEngine::default().annotate(&series);
        let file = File::create(chart_path)
            .with_context(|| format!("Failed to create {}", chart_path.display()))?;
        annotated.write_csv(file)?;
        info!("Chart data saved to {:?}", chart_path);
    }

    // Output results
    match args.output {
        OutputFormat::Json => {
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            println!("{} ({} bars, {} mode)", symbol, series.len(), mode_name(args.mode));
            println!("{}", report.summary());
            let recent = report.recent_trades(Utc::now(), args.months);
            println!("Trades in the last {} months: {}", args.months, recent.len());
            if !recent.is_empty() {
                print!("{}", BacktestReport::trades_table(&recent));
            }
        }
    }

    // Save if requested
    if let Some(save_path) = &args.save {
        let json = report.to_json()?;
        std::fs::write(save_path, json)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    Ok(())
}

fn mode_name(mode: BacktestMode) -> &'static str {
    match mode {
        BacktestMode::Consensus => "consensus",
        BacktestMode::Rules => "rules",
    }
}
