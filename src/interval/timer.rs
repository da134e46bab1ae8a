//! Pausable repeating timer
//!
//! `IntervalTimer` fires a callback every period. Unlike a bare repeating
//! registration it can be paused, resumed, reset and re-periodised while
//! running, and it keeps firings aligned to the running epoch: overrun on
//! one tick is taken off the next delay, and paused time is excluded.
//!
//! # Lifecycle
//!
//! 1. Constructed idle
//! 2. `start` arms the first firing one period out
//! 3. Each firing runs the callback, records the tick, re-arms
//! 4. `pause`/`resume` freeze and thaw the tick in progress
//! 5. `reset` restarts the clock from any state; `stop` returns to idle
//!
//! # Re-entrancy
//!
//! No internal borrow is held while the callback runs, so the callback may
//! call back into the timer. An operation made from inside the callback
//! takes precedence over the automatic re-arm.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::driver::{Clock, MonotonicClock, Scheduler, TokioScheduler};

use super::config::IntervalConfig;
use super::error::{IntervalError, validate_period};
use super::state::{Armed, Core, Phase, TimerState, drift_corrected_delay, progress_into_tick};

type Callback = Box<dyn FnMut() + 'static>;

struct Shared<C, S: Scheduler> {
    clock: C,
    scheduler: S,
    callback: RefCell<Callback>,
    core: RefCell<Core<S::Handle>>,
}

/// Repeating timer with pause, resume, reset and live period changes
///
/// Single-threaded: the timer is `!Send` and every operation, including
/// firings, runs on the thread that owns it. Dropping the timer cancels
/// the pending firing.
pub struct IntervalTimer<C = MonotonicClock, S = TokioScheduler>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    shared: Rc<Shared<C, S>>,
}

impl IntervalTimer<MonotonicClock, TokioScheduler> {
    /// Timer driven by tokio; must be used inside a `LocalSet`
    pub fn new(callback: impl FnMut() + 'static, period: Duration) -> Result<Self, IntervalError> {
        Self::with_driver(callback, period, MonotonicClock::new(), TokioScheduler::new())
    }
}

impl<C, S> IntervalTimer<C, S>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    /// Timer driven by the given clock and scheduler
    pub fn with_driver(
        callback: impl FnMut() + 'static,
        period: Duration,
        clock: C,
        scheduler: S,
    ) -> Result<Self, IntervalError> {
        validate_period(period, Duration::ZERO)?;
        Ok(Self::build(Box::new(callback), period, Duration::ZERO, clock, scheduler))
    }

    /// Timer built from a validated config, started if `autostart` is set
    pub fn from_config(
        config: &IntervalConfig,
        callback: impl FnMut() + 'static,
        clock: C,
        scheduler: S,
    ) -> Result<Self, IntervalError> {
        config.validate()?;
        let timer = Self::build(
            Box::new(callback),
            config.period(),
            config.min_period(),
            clock,
            scheduler,
        );
        if config.autostart {
            timer.start();
        }
        Ok(timer)
    }

    fn build(callback: Callback, period: Duration, min_period: Duration, clock: C, scheduler: S) -> Self {
        Self {
            shared: Rc::new(Shared {
                clock,
                scheduler,
                callback: RefCell::new(callback),
                core: RefCell::new(Core::new(period, min_period)),
            }),
        }
    }

    /// Arm the first firing one period from now
    ///
    /// No-op unless idle.
    pub fn start(&self) {
        let now = self.shared.clock.now();
        let mut core = self.shared.core.borrow_mut();
        if !matches!(core.phase, Phase::Idle) {
            return;
        }

        core.clear_accounting();
        let period = core.period;
        Shared::arm(&self.shared, &mut core, now, Duration::ZERO, period);
        tracing::debug!(period = ?period, "Interval started");
    }

    /// Cancel the pending firing and freeze the clock
    ///
    /// No-op unless running.
    pub fn pause(&self) {
        let now = self.shared.clock.now();
        let mut core = self.shared.core.borrow_mut();
        let period = core.period;

        let (epoch, overrun) = match core.phase {
            // From inside the callback the epoch is the firing that just ran
            Phase::Running { epoch, overrun, .. } | Phase::Firing { epoch, overrun } => {
                (epoch, overrun)
            }
            Phase::Idle | Phase::Paused { .. } => return,
        };
        let progress = progress_into_tick(now, epoch, overrun).min(period);

        if let Some(armed) = core.phase.disarm() {
            self.shared.scheduler.cancel(armed.handle);
        }
        core.phase = Phase::Paused {
            epoch,
            overrun,
            paused_at: now,
            progress,
        };
        tracing::debug!(progress = ?progress, "Interval paused");
    }

    /// Re-arm for whatever was left of the interrupted tick
    ///
    /// Paused time is excluded from the epoch. No-op unless paused.
    pub fn resume(&self) {
        let now = self.shared.clock.now();
        let mut core = self.shared.core.borrow_mut();
        let Phase::Paused {
            epoch,
            overrun,
            paused_at,
            progress,
        } = core.phase
        else {
            return;
        };

        let paused_for = now.saturating_sub(paused_at);
        let delay = core.period.saturating_sub(progress);
        Shared::arm(
            &self.shared,
            &mut core,
            epoch.saturating_add(paused_for),
            overrun,
            delay,
        );
        tracing::debug!(paused = ?paused_for, delay = ?delay, "Interval resumed");
    }

    /// Restart the clock and arm a full period, whatever the current state
    pub fn reset(&self) {
        let now = self.shared.clock.now();
        let mut core = self.shared.core.borrow_mut();

        if let Some(armed) = core.phase.disarm() {
            self.shared.scheduler.cancel(armed.handle);
        }
        core.clear_accounting();
        let period = core.period;
        Shared::arm(&self.shared, &mut core, now, Duration::ZERO, period);
        tracing::debug!(period = ?period, "Interval reset");
    }

    /// Cancel the pending firing and return to idle
    ///
    /// A stopped timer can be started again.
    pub fn stop(&self) {
        let mut core = self.shared.core.borrow_mut();
        if matches!(core.phase, Phase::Idle) {
            return;
        }
        if let Some(armed) = core.phase.disarm() {
            self.shared.scheduler.cancel(armed.handle);
        }
        core.phase = Phase::Idle;
        tracing::debug!(ticks = core.ticks, "Interval stopped");
    }

    /// Change the period
    ///
    /// A running timer keeps the time already spent in the tick in progress
    /// and fires once the new period has elapsed since that tick began, or
    /// immediately if it already has. Completed ticks are not affected.
    pub fn set_period(&self, period: Duration) -> Result<(), IntervalError> {
        let now = self.shared.clock.now();
        let mut core = self.shared.core.borrow_mut();
        validate_period(period, core.min_period)?;
        core.period = period;

        if let Phase::Running { epoch, overrun, .. } = core.phase {
            let spent = progress_into_tick(now, epoch, overrun);
            if let Some(armed) = core.phase.disarm() {
                self.shared.scheduler.cancel(armed.handle);
            }
            Shared::arm(
                &self.shared,
                &mut core,
                epoch,
                overrun,
                period.saturating_sub(spent),
            );
        }
        tracing::debug!(period = ?period, state = ?core.phase.state(), "Interval period changed");
        Ok(())
    }

    /// Armed (or firing) and not paused
    pub fn is_running(&self) -> bool {
        self.state() == TimerState::Running
    }

    pub fn state(&self) -> TimerState {
        self.shared.core.borrow().phase.state()
    }

    pub fn period(&self) -> Duration {
        self.shared.core.borrow().period
    }

    /// Running time of the most recently completed tick
    ///
    /// Zero until the first firing completes.
    pub fn elapsed_since_last_tick(&self) -> Duration {
        self.shared.core.borrow().last_tick_elapsed
    }

    /// Time until the next firing
    ///
    /// While paused this is what was left of the interrupted tick; while
    /// idle it is the full period.
    pub fn remaining_time(&self) -> Duration {
        let now = self.shared.clock.now();
        self.shared.core.borrow().remaining_time(now)
    }

    /// Firings since the last start or reset
    pub fn ticks(&self) -> u64 {
        self.shared.core.borrow().ticks
    }
}

impl<C, S> Shared<C, S>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    /// Register the next firing and enter `Running`
    fn arm(
        this: &Rc<Self>,
        core: &mut Core<S::Handle>,
        epoch: Duration,
        overrun: Duration,
        delay: Duration,
    ) {
        let generation = core.next_generation();
        let weak: Weak<Self> = Rc::downgrade(this);
        let handle = this.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::fire(&shared, generation);
                }
            }),
        );
        core.phase = Phase::Running {
            epoch,
            overrun,
            armed: Armed { handle, generation },
        };
    }

    fn fire(this: &Rc<Self>, generation: u64) {
        let fired_at = this.clock.now();
        {
            let mut core = this.core.borrow_mut();
            if !core.is_live(generation) {
                // Cancelled or replaced after the scheduler had already dispatched it
                tracing::trace!(generation, state = ?core.phase.state(), "Ignoring stale firing");
                return;
            }
            let Phase::Running { epoch, overrun, .. } = core.phase else {
                return;
            };

            // The tick was due `period - overrun` after the previous firing
            let actual = fired_at.saturating_sub(epoch);
            let overrun = progress_into_tick(fired_at, epoch, overrun).saturating_sub(core.period);
            // The registration has run; nothing is left to cancel
            let _ = core.phase.disarm();
            core.phase = Phase::Firing {
                epoch: fired_at,
                overrun,
            };
            core.last_tick_elapsed = actual;
            core.ticks += 1;
            tracing::trace!(tick = core.ticks, elapsed = ?actual, overrun = ?overrun, "Interval fired");
        }

        match this.callback.try_borrow_mut() {
            Ok(mut callback) => (*callback)(),
            // Only reachable if the callback drives its own scheduler
            Err(_) => tracing::warn!("Interval callback re-entered itself, skipping"),
        }

        let now = this.clock.now();
        let mut core = this.core.borrow_mut();
        let Phase::Firing { epoch, overrun } = core.phase else {
            tracing::trace!(state = ?core.phase.state(), "Callback changed timer state, not re-arming");
            return;
        };

        let delay = drift_corrected_delay(core.period, overrun, now.saturating_sub(epoch));
        Shared::arm(this, &mut core, epoch, overrun, delay);
    }
}

impl<C, S> Drop for IntervalTimer<C, S>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    fn drop(&mut self) {
        if let Ok(mut core) = self.shared.core.try_borrow_mut() {
            if let Some(armed) = core.phase.disarm() {
                self.shared.scheduler.cancel(armed.handle);
            }
            core.phase = Phase::Idle;
        }
    }
}

impl<C, S> std::fmt::Debug for IntervalTimer<C, S>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("IntervalTimer")
            .field("state", &core.phase.state())
            .field("period", &core.period)
            .field("ticks", &core.ticks)
            .finish()
    }
}
