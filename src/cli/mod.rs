//! CLI definitions.

pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use signal_config::{load_config, AppConfig};
use signal_monitor::{setup_logging, LogGuard};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quant-signal")]
#[command(author, version, about = "Multi-indicator consensus signals, backtests and a position ledger")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level, overrides the configuration file
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate the latest consensus signal for each symbol
    Evaluate(EvaluateArgs),
    /// Replay historical signals through the single-position backtester
    Backtest(BacktestArgs),
    /// Show ledger positions and statistics
    Positions(PositionsArgs),
    /// Evaluate periodically and keep the ledger up to date
    Watch(WatchArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Symbols to evaluate (comma-separated), defaults to the configured list
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// CSV file or directory of CSV files, defaults to the configured data dir
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Apply the signals to the position ledger
    #[arg(long)]
    pub apply: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Symbol to backtest, defaults to the first configured symbol
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// CSV file or directory of CSV files, defaults to the configured data dir
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Signal source to replay
    #[arg(long, default_value = "consensus")]
    pub mode: BacktestMode,

    /// Only use bars from the last N days
    #[arg(long)]
    pub days: Option<i64>,

    /// Months of trades listed in the trade table
    #[arg(long, default_value = "6")]
    pub months: u32,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Save the report as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write the annotated series (indicators + markers) as CSV for charting
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct PositionsArgs {
    /// Restrict to one symbol
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Include closed positions
    #[arg(long)]
    pub all: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Symbols to watch (comma-separated), defaults to the configured list
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Directory of CSV files, defaults to the configured data dir
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Seconds between evaluations, defaults to the configured interval
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BacktestMode {
    /// Per-bar consensus of the EMA, MACD and KDJ detectors
    Consensus,
    /// MA/MACD/RSI rule markers of the indicator engine
    Rules,
}

/// Load the configuration file, or the defaults when it does not exist.
pub fn load_settings(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the parsed command.
///
/// `validate-config` inspects the file itself, so it runs before the
/// configuration is loaded and logging is installed.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        log_level,
        json_logs,
        command,
    } = cli;
    let startup = || start(&config_path, log_level, json_logs);

    match command {
        Commands::ValidateConfig => commands::validate::run(&config_path).await,
        Commands::Evaluate(args) => {
            let (config, _guard) = startup()?;
            commands::evaluate::run(args, &config).await
        }
        Commands::Backtest(args) => {
            let (config, _guard) = startup()?;
            commands::backtest::run(args, &config).await
        }
        Commands::Positions(args) => {
            let (config, _guard) = startup()?;
            commands::positions::run(args, &config).await
        }
        Commands::Watch(args) => {
            let (config, _guard) = startup()?;
            commands::watch::run(args, &config).await
        }
    }
}

fn start(path: &Path, log_level: Option<LogLevel>, json_logs: bool) -> Result<(AppConfig, LogGuard)> {
    let config = load_settings(path)?;
    let level = log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = json_logs || config.logging.is_json();
    let guard = setup_logging(&level, json, config.logging.file.as_deref())?;
    Ok((config, guard))
}

/// Symbols from the command line, or the configured ones.
pub fn symbols_or_default(symbols: &[String], config: &AppConfig) -> Vec<String> {
    if symbols.is_empty() {
        config.symbols.clone()
    } else {
        symbols.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "quant-signal",
            "evaluate",
            "-S",
            "AR/USDT,SOL/USDT",
            "--apply",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.symbols, vec!["AR/USDT", "SOL/USDT"]);
                assert!(args.apply);
                assert!(args.output == OutputFormat::Json);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_parse_backtest_defaults() {
        let cli = Cli::try_parse_from(["quant-signal", "-l", "debug", "backtest"]).unwrap();
        assert_eq!(cli.log_level.map(|l| l.as_str()), Some("debug"));

        match cli.command {
            Commands::Backtest(args) => {
                assert!(args.mode == BacktestMode::Consensus);
                assert_eq!(args.months, 6);
                assert!(args.symbol.is_none());
            }
            _ => panic!("expected backtest"),
        }
    }

    #[tokio::test]
    async fn test_validate_config_runs_without_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[signals]\nstrong_threshold = 0.5\nmedium_threshold = 0.7\n").unwrap();
        let path = path.to_str().unwrap();

        let ok = Cli::try_parse_from(["quant-signal", "-c", "missing.toml", "validate-config"]).unwrap();
        assert!(run(ok).await.is_ok());

        let bad = Cli::try_parse_from(["quant-signal", "-c", path, "validate-config"]).unwrap();
        assert!(run(bad).await.is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_settings(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.signals.max_holding_days, 7);
        assert_eq!(symbols_or_default(&[], &config), config.symbols);
        assert_eq!(symbols_or_default(&["X".into()], &config), vec!["X"]);
    }
}
