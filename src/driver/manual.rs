//! Virtual time driven by hand
//!
//! `ManualClock` only moves when told to. `ManualScheduler` keeps its
//! registrations in a queue ordered by due time and runs them as the clock
//! is advanced past them, setting the clock to each task's due time before
//! running it. Tasks may advance the clock themselves to simulate work.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use super::{Clock, Scheduler, Task};

/// Clock that advances only when asked
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta`
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    /// Move time forward to `at`; earlier targets are ignored
    pub fn advance_to(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Registration in a [`ManualScheduler`] queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualHandle {
    due: Duration,
    seq: u64,
}

impl ManualHandle {
    /// Virtual time at which the task runs
    pub fn due(&self) -> Duration {
        self.due
    }
}

#[derive(Default)]
struct Queue {
    next_seq: u64,
    tasks: BTreeMap<ManualHandle, Task>,
}

/// Scheduler running registrations against a [`ManualClock`]
///
/// Clones share the same queue and clock.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Rc::new(RefCell::new(Queue::default())),
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Number of registrations waiting to run
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Due time of the earliest registration
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.borrow().tasks.keys().next().map(ManualHandle::due)
    }

    /// Advance virtual time by `delta`, running every task that falls due
    ///
    /// Returns the number of tasks run. Tasks scheduled by other tasks run
    /// in the same call if they fall due before the target.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.clock.now().saturating_add(delta);
        let mut ran = 0;

        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }

        self.clock.advance_to(target);
        ran
    }

    /// Run every task already due at the current time
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Drop all registrations without running them
    pub fn clear(&self) {
        self.queue.borrow_mut().tasks.clear();
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut queue = self.queue.borrow_mut();
        let key = *queue.tasks.keys().next()?;
        if key.due > target {
            return None;
        }
        let task = queue.tasks.remove(&key)?;
        drop(queue);

        self.clock.advance_to(key.due);
        Some(task)
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.clock.now())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle {
        let mut queue = self.queue.borrow_mut();
        let handle = ManualHandle {
            due: self.clock.now().saturating_add(delay),
            seq: queue.next_seq,
        };
        queue.next_seq += 1;
        queue.tasks.insert(handle, task);
        handle
    }

    fn cancel(&self, handle: Self::Handle) {
        self.queue.borrow_mut().tasks.remove(&handle);
    }
}
