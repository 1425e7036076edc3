//! Configuration for the pneuma host

use std::path::PathBuf;

use pneuma_types::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

/// Main host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PneumaConfig {
    /// Session driving
    #[serde(default)]
    pub session: SessionConfig,

    /// Trust registry persistence
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra patterns merged over the built-in catalog
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pattern to load
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Stop after this many cycles (defaults to the pattern's recommendation)
    #[serde(default)]
    pub cycles: Option<u32>,

    /// Heartbeat frequency
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Heartbeat gaps at or above this are dropped
    #[serde(default = "default_max_tick_gap")]
    pub max_tick_gap_secs: f64,

    /// Run on a virtual clock without sleeping
    #[serde(default)]
    pub simulate: bool,

    /// Mark the host hidden after this many session seconds
    #[serde(default)]
    pub simulate_hidden_after_secs: Option<f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            cycles: None,
            tick_hz: default_tick_hz(),
            max_tick_gap_secs: default_max_tick_gap(),
            simulate: false,
            simulate_hidden_after_secs: None,
        }
    }
}

impl SessionConfig {
    /// Heartbeat period in milliseconds, at least 1.
    pub fn tick_period_ms(&self) -> u64 {
        (1000 / u64::from(self.tick_hz.max(1))).max(1)
    }
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON file holding the trust registry; none keeps it in memory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_pattern() -> String {
    "box".to_string()
}

fn default_tick_hz() -> u32 {
    60
}

fn default_max_tick_gap() -> f64 {
    pneuma_kernel::heartbeat::DEFAULT_MAX_GAP_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PneumaConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `PNEUMA_<SECTION>__<KEY>` environment variables.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&PneumaConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Keys contain underscores, so sections are split on a double one.
        builder = builder.add_source(
            config::Environment::with_prefix("PNEUMA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
