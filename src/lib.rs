//! Pausable, drift-correcting interval timer
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pacer::{IntervalError, IntervalTimer};
//!
//! async fn tick_twice() -> Result<u64, IntervalError> {
//!     let timer = IntervalTimer::new(|| println!("tick"), Duration::from_millis(100))?;
//!     let local = tokio::task::LocalSet::new();
//!     local
//!         .run_until(async {
//!             timer.start();
//!             tokio::time::sleep(Duration::from_millis(250)).await;
//!             timer.pause();
//!         })
//!         .await;
//!     Ok(timer.ticks())
//! }
//! ```

pub mod driver;
pub mod interval;

// Re-exports for convenience
pub use driver::{Clock, ManualClock, ManualScheduler, MonotonicClock, Scheduler, TokioScheduler};
pub use interval::{ConfigError, IntervalConfig, IntervalError, IntervalTimer, TimerState};
