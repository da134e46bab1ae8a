//! Interval timer
//!
//! This module provides:
//! - **Timer**: `IntervalTimer`, the pausable repeating timer
//! - **State**: tagged phase bookkeeping and the public `TimerState`
//! - **Config**: `IntervalConfig`, loaded from TOML
//!
//! # Time accounting
//!
//! Firings are scheduled relative to the running epoch rather than the
//! previous firing:
//! - Overrun on one tick is taken off the next delay
//! - Paused time is excluded from elapsed and remaining time
//! - Period changes adjust the tick in progress instead of restarting it

mod config;
mod error;
mod state;
mod timer;


pub use config::IntervalConfig;
pub use error::{ConfigError, IntervalError};
pub use state::TimerState;
pub use timer::IntervalTimer;
