//! Validate configuration command.

use anyhow::Result;
use signal_config::{load_config, AppConfig};
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = if config_path.exists() {
        load_config(config_path)?
    } else {
        println!("File not found, checking built-in defaults");
        AppConfig::default()
    };

    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Symbols: {}", config.symbols.join(", "));
            println!(
                "Thresholds: strong >= {}, medium >= {}",
                config.signals.strong_threshold, config.signals.medium_threshold
            );
            println!("Max holding days: {}", config.signals.max_holding_days);
            println!("Notify from: {}", config.notify.min_level);
            println!("Ledger: {}", config.ledger.path.display());
            println!();
            print!("{}", config.to_toml()?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
