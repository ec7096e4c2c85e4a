use crate::analysis::{BatchOptions, DEFAULT_PACING, DEFAULT_WINDOW_SIZE};
use crate::api::binance::{
    BinanceClient, BINANCE_FUTURES_API_BASE, DEFAULT_RATE_LIMIT_RPM, DEFAULT_TIMEOUT_SECS,
};
use crate::error::FetchError;
use crate::models::Granularity;
use crate::strategy::signals::{SignalConfig, MIN_CANDLES};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Optional config file looked up in the working directory (any supported extension)
pub const CONFIG_FILE: &str = "trendcheck";
/// Prefix for environment overrides, e.g. `TRENDCHECK_API_KEY`
pub const ENV_PREFIX: &str = "TRENDCHECK";

/// Application configuration
///
/// Layered: built-in defaults, then `trendcheck.toml` (optional), then
/// `TRENDCHECK_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub interval: Granularity,
    pub window_size: usize,
    pub pacing_ms: u64,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    pub min_candles: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(File::with_name(CONFIG_FILE).required(false))
    }

    fn load_with<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .set_default("base_url", BINANCE_FUTURES_API_BASE)?
            .set_default("interval", Granularity::default().as_str())?
            .set_default("window_size", DEFAULT_WINDOW_SIZE as i64)?
            .set_default("pacing_ms", DEFAULT_PACING.as_millis() as i64)?
            .set_default("requests_per_minute", DEFAULT_RATE_LIMIT_RPM as i64)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("min_candles", MIN_CANDLES as i64)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::default()
            .with_window_size(self.window_size)
            .with_pacing(Duration::from_millis(self.pacing_ms))
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig::default().with_min_candles(self.min_candles)
    }

    pub fn binance_client(&self) -> Result<BinanceClient, FetchError> {
        BinanceClient::new(
            self.base_url.clone(),
            self.api_key.clone(),
            self.requests_per_minute,
            Duration::from_secs(self.timeout_secs),
        )
    }
}
