//! Configuration structures.

use serde::{Deserialize, Serialize};
use signal_core::error::SignalError;
use signal_core::types::{SignalLevel, Timeframe};
use signal_detectors::{ConsensusConfig, EmaDetectorConfig, KdjDetectorConfig, MacdDetectorConfig};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Instruments evaluated by `evaluate` and `watch`
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub signals: SignalSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            symbols: default_symbols(),
            signals: SignalSettings::default(),
            notify: NotifySettings::default(),
            ledger: LedgerSettings::default(),
            data: DataSettings::default(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    vec!["AR/USDT".to_string()]
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), SignalError> {
        self.consensus().validate()?;

        if self.symbols.is_empty() {
            return Err(SignalError::Config("at least one symbol is required".into()));
        }
        if let Some(symbol) = self.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(SignalError::Config(format!("invalid symbol: {:?}", symbol)));
        }
        if self.signals.max_holding_days == 0 {
            return Err(SignalError::Config(
                "max_holding_days must be greater than 0".into(),
            ));
        }
        if self.data.interval_secs == 0 {
            return Err(SignalError::Config(
                "data.interval_secs must be greater than 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SignalError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Detector and threshold settings for the consensus aggregator.
    pub fn consensus(&self) -> ConsensusConfig {
        let indicators = &self.signals.indicators;
        ConsensusConfig {
            ema: indicators.ema.clone(),
            macd: indicators.macd.clone(),
            kdj: indicators.kdj.clone(),
            strong_threshold: self.signals.strong_threshold,
            medium_threshold: self.signals.medium_threshold,
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SignalError> {
        toml::to_string_pretty(self).map_err(|e| SignalError::Serialization(e.to_string()))
    }
}

impl From<&AppConfig> for ConsensusConfig {
    fn from(config: &AppConfig) -> Self {
        config.consensus()
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quant-signal".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling log file, in addition to stdout
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Consensus thresholds, holding limit and detector parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    pub strong_threshold: f64,
    pub medium_threshold: f64,
    /// Whole days after which an open position is force-closed
    pub max_holding_days: u32,
    pub indicators: IndicatorSettings,
}

impl Default for SignalSettings {
    fn default() -> Self {
        let consensus = ConsensusConfig::default();
        Self {
            strong_threshold: consensus.strong_threshold,
            medium_threshold: consensus.medium_threshold,
            max_holding_days: 7,
            indicators: IndicatorSettings::default(),
        }
    }
}

/// Detector periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ema: EmaDetectorConfig,
    pub macd: MacdDetectorConfig,
    pub kdj: KdjDetectorConfig,
}

/// Notification gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Lowest level worth notifying about
    pub min_level: SignalLevel,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            min_level: SignalLevel::Medium,
        }
    }
}

/// Position ledger storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub path: PathBuf,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/positions.json"),
        }
    }
}

/// Bar input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory of `<SYMBOL>_<interval>.csv` files
    pub dir: PathBuf,
    pub timeframe: Timeframe,
    /// Most recent bars to evaluate (0 = all)
    pub limit: usize,
    /// Seconds between `watch` evaluations
    pub interval_secs: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            timeframe: Timeframe::Hour4,
            limit: 200,
            interval_secs: 4 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signals.max_holding_days, 7);
        assert_eq!(config.notify.min_level, SignalLevel::Medium);
        assert_eq!(config.data.timeframe, Timeframe::Hour4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.signals.max_holding_days = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.signals.indicators.ema.fast_period = 30;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.symbols.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_consensus_conversion() {
        let mut config = AppConfig::default();
        config.signals.strong_threshold = 0.9;
        config.signals.indicators.kdj.period = 14;

        let consensus = ConsensusConfig::from(&config);
        assert_eq!(consensus.strong_threshold, 0.9);
        assert_eq!(consensus.kdj.period, 14);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("max_holding_days = 7"));

        let back: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back.symbols, config.symbols);
        assert_eq!(back.data.interval_secs, config.data.interval_secs);
    }
}
