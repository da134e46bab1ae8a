//! Scheduling collaborators
//!
//! An interval timer needs two things from its environment:
//! - **Clock**: current time as a monotonic offset
//! - **Scheduler**: arm a one-shot task after a delay, cancel it before it runs
//!
//! Two pairs are provided:
//! - [`MonotonicClock`] + [`TokioScheduler`] for use on a tokio `LocalSet`
//! - [`ManualClock`] + [`ManualScheduler`] for virtual time driven by hand

mod clock;
mod local;
mod manual;

use std::time::Duration;

pub use clock::{Clock, MonotonicClock};
pub use local::TokioScheduler;
pub use manual::{ManualClock, ManualHandle, ManualScheduler};

/// A one-shot task handed to a scheduler
pub type Task = Box<dyn FnOnce() + 'static>;

/// One-shot delayed execution with cancellation
///
/// Implementations must guarantee that a cancelled task never runs. All
/// calls happen on a single thread of control.
pub trait Scheduler {
    /// Registration returned by [`schedule`](Scheduler::schedule)
    type Handle;

    /// Run `task` once after `delay`
    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle;

    /// Cancel a registration that has not run yet
    fn cancel(&self, handle: Self::Handle);
}
