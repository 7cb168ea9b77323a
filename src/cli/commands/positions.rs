//! Positions command implementation.

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use signal_config::AppConfig;
use signal_core::types::Position;

use super::open_ledger;
use crate::cli::{OutputFormat, PositionsArgs};

pub async fn run(args: PositionsArgs, config: &AppConfig) -> Result<()> {
    let ledger = open_ledger(config);
    let symbol = args.symbol.as_deref();

    let positions: Vec<&Position> = if args.all {
        ledger.all_positions(symbol)
    } else {
        ledger.open_positions(symbol)
    };
    let stats = ledger.statistics(symbol);

    match args.output {
        OutputFormat::Json => {
            let out = json!({ "positions": positions, "statistics": stats });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            let now = Utc::now();
            println!(
                "{:<14} {:<6} {:<13} {:>10} {:>10} {:>9} {:>5}",
                "Instrument", "Side", "Status", "Entry", "Exit", "P&L %", "Days"
            );
            println!("{}", "─".repeat(74));
            for p in &positions {
                let exit = p.exit_price.map_or("-".to_string(), |x| format!("{:.4}", x));
                let pnl = p
                    .profit_loss_pct
                    .map_or("-".to_string(), |x| format!("{:+.2}%", x));
                let days = p.holding_days.unwrap_or_else(|| p.age_days(now));
                println!(
                    "{:<14} {:<6} {:<13} {:>10.4} {:>10} {:>9} {:>5}",
                    p.instrument,
                    p.side.to_string(),
                    format!("{:?}", p.status),
                    p.entry_price,
                    exit,
                    pnl,
                    days
                );
            }
            println!();
            println!("Total trades:     {}", stats.total_trades);
            println!("Open / closed:    {} / {}", stats.open_trades, stats.closed_trades);
            println!("Wins / losses:    {} / {}", stats.win_trades, stats.loss_trades);
            println!("Win rate:         {:.1}%", stats.win_rate);
            println!("Total profit:     {:.4}", stats.total_profit);
            println!("Avg per trade:    {:.4}", stats.avg_profit_per_trade);
            println!("Max holding days: {}", ledger.max_holding_days());
        }
    }

    Ok(())
}
