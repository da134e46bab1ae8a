//! Time sources for interval timers
//!
//! A clock reports the time elapsed since an arbitrary fixed origin. The
//! value must never go backwards for the lifetime of the clock.

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic time source
pub trait Clock {
    /// Time elapsed since this clock's origin
    fn now(&self) -> Duration;
}

/// Clock backed by the tokio time driver
///
/// Uses `tokio::time::Instant`, so it follows tokio's paused test time
/// when the runtime is started with `start_paused = true`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_follows_tokio_time() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.now(), Duration::from_millis(250));
    }
}
