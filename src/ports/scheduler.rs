//! Scheduler port - Cancellable one-shot timers.
//!
//! Observer reconnect delays are requested through this port so tests can
//! fire timers on demand instead of sleeping real seconds.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

/// Port for scheduling one-shot timers.
pub trait Scheduler: Send + Sync {
    /// Returns a timer that completes once `delay` has elapsed.
    fn schedule(&self, delay: Duration) -> Timer;
}

/// Pending one-shot timer.
///
/// Await it to wait for the deadline; drop it (or call [`Timer::cancel`])
/// to cancel. A cancelled timer never fires.
#[derive(Debug)]
pub struct Timer {
    delay: Duration,
    fired: oneshot::Receiver<()>,
}

impl Timer {
    /// Creates a timer paired with the trigger that fires it.
    pub fn new(delay: Duration) -> (Self, TimerTrigger) {
        let (tx, rx) = oneshot::channel();
        (Self { delay, fired: rx }, TimerTrigger(tx))
    }

    /// The delay this timer was scheduled with.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn cancel(self) {}
}

impl Future for Timer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match Pin::new(&mut self.fired).poll(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(()),
            // Trigger dropped without firing: the scheduler is gone, never wake.
            Poll::Ready(Err(_)) => Poll::Pending,
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Scheduler-side half of a [`Timer`].
#[derive(Debug)]
pub struct TimerTrigger(oneshot::Sender<()>);

impl TimerTrigger {
    /// Fires the timer. Returns `false` if it was already cancelled.
    pub fn fire(self) -> bool {
        self.0.send(()).is_ok()
    }

    /// True once the timer side has been dropped.
    pub fn is_cancelled(&self) -> bool {
        self.0.is_closed()
    }

    /// Resolves when the timer side is dropped.
    pub async fn cancelled(&mut self) {
        self.0.closed().await
    }
}
