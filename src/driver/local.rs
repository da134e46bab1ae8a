//! Tokio-backed scheduler
//!
//! Each registration is a local task that sleeps for the delay and then
//! runs. Cancellation aborts the task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::{Scheduler, Task};

/// Scheduler running tasks on the current `LocalSet`
///
/// Tasks are spawned with `tokio::task::spawn_local`, so every call must
/// happen from inside a `LocalSet` (`run_until`, or `LocalSet::block_on`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle {
        tokio::task::spawn_local(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            task();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}
