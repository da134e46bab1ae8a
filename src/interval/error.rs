//! Error types for interval timers

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from period validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("interval period must be greater than zero")]
    ZeroPeriod,

    #[error("interval period {period:?} is below the minimum of {minimum:?}")]
    BelowMinimum { period: Duration, minimum: Duration },
}

/// Errors while loading an interval configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read interval config {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse interval config TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid interval config")]
    Invalid(#[from] IntervalError),
}

/// Check a period against an inclusive lower bound
///
/// A zero period is always rejected, whatever the bound.
pub(crate) fn validate_period(period: Duration, minimum: Duration) -> Result<(), IntervalError> {
    if period.is_zero() {
        return Err(IntervalError::ZeroPeriod);
    }
    if period < minimum {
        return Err(IntervalError::BelowMinimum { period, minimum });
    }
    Ok(())
}
