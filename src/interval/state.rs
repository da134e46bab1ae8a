//! Interval timer bookkeeping
//!
//! The timer's phase is a tagged state, so a paused timer can never hold a
//! live registration and an idle timer has no epoch to misread.
//!
//! All times are offsets reported by the timer's [`Clock`](crate::Clock).
//! `epoch` marks the firing that began the tick in progress, measured in
//! running time: it moves forward on every firing and by the length of
//! every pause. `overrun` is how late that firing was, so the tick is due
//! at `epoch + period - overrun` and its progress is
//! `now - epoch + overrun`.

use std::time::Duration;

/// Externally visible timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Constructed (or stopped), not started
    Idle,
    /// Armed and ticking
    Running,
    /// Clock frozen, nothing armed
    Paused,
}

/// A live scheduler registration
#[derive(Debug)]
pub(crate) struct Armed<H> {
    pub handle: H,
    pub generation: u64,
}

#[derive(Debug)]
pub(crate) enum Phase<H> {
    Idle,

    Running {
        epoch: Duration,
        overrun: Duration,
        armed: Armed<H>,
    },

    /// The registration has been consumed and the callback is executing
    Firing {
        epoch: Duration,
        overrun: Duration,
    },

    Paused {
        epoch: Duration,
        overrun: Duration,
        paused_at: Duration,
        /// Running time already spent in the interrupted tick
        progress: Duration,
    },
}

impl<H> Phase<H> {
    pub fn state(&self) -> TimerState {
        match self {
            Phase::Idle => TimerState::Idle,
            Phase::Running { .. } | Phase::Firing { .. } => TimerState::Running,
            Phase::Paused { .. } => TimerState::Paused,
        }
    }

    /// Take the live registration out, leaving the timer idle
    pub fn disarm(&mut self) -> Option<Armed<H>> {
        match std::mem::replace(self, Phase::Idle) {
            Phase::Running { armed, .. } => Some(armed),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Mutable timer record, owned by the timer behind a `RefCell`
#[derive(Debug)]
pub(crate) struct Core<H> {
    pub period: Duration,
    pub min_period: Duration,
    pub phase: Phase<H>,
    /// Running time of the most recently completed tick
    pub last_tick_elapsed: Duration,
    /// Completed firings since the last start or reset
    pub ticks: u64,
    generation: u64,
}

impl<H> Core<H> {
    pub fn new(period: Duration, min_period: Duration) -> Self {
        Self {
            period,
            min_period,
            phase: Phase::Idle,
            last_tick_elapsed: Duration::ZERO,
            ticks: 0,
            generation: 0,
        }
    }

    /// Reserve the generation for the next registration
    pub fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Whether `generation` identifies the registration currently armed
    pub fn is_live(&self, generation: u64) -> bool {
        matches!(&self.phase, Phase::Running { armed, .. } if armed.generation == generation)
    }

    /// Clear per-run accounting (start, reset)
    pub fn clear_accounting(&mut self) {
        self.last_tick_elapsed = Duration::ZERO;
        self.ticks = 0;
    }

    /// Time left until the next firing
    ///
    /// Idle timers report the full period. Paused timers report what was
    /// left of the interrupted tick.
    pub fn remaining_time(&self, now: Duration) -> Duration {
        match self.phase {
            Phase::Idle => self.period,
            Phase::Running { epoch, overrun, .. } | Phase::Firing { epoch, overrun } => {
                remaining_in_tick(self.period, progress_into_tick(now, epoch, overrun))
            }
            Phase::Paused { progress, .. } => self.period.saturating_sub(progress),
        }
    }
}

/// Delay from now until the next firing
///
/// `overrun` is how late the last firing was past its period and `busy` is
/// the time spent since it fired (running the callback). Both are taken
/// off the period, so firings stay aligned to whole periods instead of
/// slipping by the jitter every tick.
pub(crate) fn drift_corrected_delay(period: Duration, overrun: Duration, busy: Duration) -> Duration {
    period.saturating_sub(overrun).saturating_sub(busy)
}

/// Running time spent in the tick that began with the firing at `epoch`
pub(crate) fn progress_into_tick(now: Duration, epoch: Duration, overrun: Duration) -> Duration {
    now.saturating_sub(epoch).saturating_add(overrun)
}

/// `period - (since_epoch mod period)`
pub(crate) fn remaining_in_tick(period: Duration, since_epoch: Duration) -> Duration {
    let period_ns = period.as_nanos();
    if period_ns == 0 {
        return Duration::ZERO;
    }
    let into_tick = since_epoch.as_nanos() % period_ns;
    Duration::from_nanos(u64::try_from(period_ns - into_tick).unwrap_or(u64::MAX))
}
