//! Configuration types for realized-vol

use crate::model::VolatilityKind;
use crate::series::FillPolicy;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub spikes: SpikeConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Volatility engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rolling window in trading days
    #[serde(default = "default_window")]
    pub window: usize,

    /// Scale estimates by sqrt(trading_days_per_year)
    #[serde(default = "default_true")]
    pub annualize: bool,

    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: NonZeroU32,

    /// Missing-value policy applied when building price series
    #[serde(default)]
    pub fill_policy: FillPolicy,
}

fn default_window() -> usize {
    21
}
fn default_true() -> bool {
    true
}
fn default_trading_days() -> NonZeroU32 {
    crate::model::TRADING_DAYS_PER_YEAR
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            annualize: true,
            trading_days_per_year: default_trading_days(),
            fill_policy: FillPolicy::ForwardBackward,
        }
    }
}

/// Spike detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeConfig {
    /// Standard deviations above the mean
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_max_annotations")]
    pub max_annotations: usize,

    /// Series the annotations are drawn from
    #[serde(default = "default_spike_source")]
    pub source: VolatilityKind,
}

fn default_threshold() -> f64 {
    crate::signal::DEFAULT_THRESHOLD
}
fn default_max_annotations() -> usize {
    crate::signal::DEFAULT_MAX_ANNOTATIONS
}
fn default_spike_source() -> VolatilityKind {
    VolatilityKind::Realized
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_annotations: default_max_annotations(),
            source: default_spike_source(),
        }
    }
}

/// Price feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page listing S&P 500 constituents
    #[serde(default = "default_constituents_url")]
    pub constituents_url: String,

    /// Maximum cached requests; 0 disables caching
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cached responses older than this are refetched; 0 never expires
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    crate::feed::YAHOO_CHART_URL.to_string()
}
fn default_constituents_url() -> String {
    crate::feed::SP500_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("realized-vol/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_cache_capacity() -> usize {
    32
}
fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            constituents_url: default_constituents_url(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
