//! Interval configuration loaded from TOML
//!
//! ```toml
//! period_ms = 250
//! min_period_ms = 10
//! autostart = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::error::{ConfigError, IntervalError, validate_period};

fn default_min_period_ms() -> u64 {
    1
}

/// Settings for constructing an [`IntervalTimer`](super::IntervalTimer)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntervalConfig {
    /// Interval period in milliseconds
    pub period_ms: u64,

    /// Smallest period accepted by `set_period`
    #[serde(default = "default_min_period_ms")]
    pub min_period_ms: u64,

    /// Start the timer as soon as it is built
    #[serde(default)]
    pub autostart: bool,
}

impl IntervalConfig {
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: period.as_millis().try_into().unwrap_or(u64::MAX),
            min_period_ms: default_min_period_ms(),
            autostart: false,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn min_period(&self) -> Duration {
        Duration::from_millis(self.min_period_ms)
    }

    pub fn validate(&self) -> Result<(), IntervalError> {
        validate_period(self.period(), self.min_period())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            period_ms = config.period_ms,
            min_period_ms = config.min_period_ms,
            autostart = config.autostart,
            "Loaded interval config"
        );
        Ok(config)
    }
}
