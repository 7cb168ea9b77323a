//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSettings, IndicatorSettings, LedgerSettings, LoggingConfig,
    NotifySettings, SignalSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Prefix of environment overrides, e.g. `QUANT_SIGNAL__SIGNALS__MAX_HOLDING_DAYS=5`.
pub const ENV_PREFIX: &str = "QUANT_SIGNAL";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("symbols")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
