//! Scheduler adapters.
//!
//! - `TokioScheduler` - Real timers backed by `tokio::time`
//! - `ManualScheduler` - Timers fired explicitly by tests

use std::time::Duration;

use parking_lot::Mutex;

use crate::ports::{Scheduler, Timer, TimerTrigger};

/// Fires timers after real time elapses.
///
/// Each timer is a spawned task that exits early when the timer is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration) -> Timer {
        let (timer, mut trigger) = Timer::new(delay);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    trigger.fire();
                }
                _ = trigger.cancelled() => {
                    tracing::trace!(?delay, "Timer cancelled before firing");
                }
            }
        });
        timer
    }
}

/// Records requested delays and fires timers only when asked.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<TimerTrigger>>,
    requested: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay ever requested, in order.
    pub fn requested_delays(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }

    /// Number of timers neither fired nor cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .iter()
            .filter(|trigger| !trigger.is_cancelled())
            .count()
    }

    /// Fires every pending timer. Returns how many were still live.
    pub fn fire_all(&self) -> usize {
        let triggers: Vec<TimerTrigger> = self.pending.lock().drain(..).collect();
        triggers
            .into_iter()
            .map(TimerTrigger::fire)
            .filter(|fired| *fired)
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration) -> Timer {
        let (timer, trigger) = Timer::new(delay);
        self.requested.lock().push(delay);
        self.pending.lock().push(trigger);
        timer
    }
}
