//! Tick sources for the interval timer.
//!
//! The timer never owns a timer primitive directly. It asks a [`Clock`] for a
//! repeating subscription and keeps the returned [`TickSubscription`] until it
//! wants the ticks to stop.
//!
//! - [`TokioClock`] backs subscriptions with `tokio::time::interval`.
//! - [`ManualClock`] fires ticks only when told to, for deterministic tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

/// Callback invoked on every tick of a subscription.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Handle to a live repeating subscription.
///
/// Cancelling is idempotent. Dropping the handle cancels it as well.
pub trait TickSubscription {
    /// Stops further ticks.
    fn cancel(&mut self);

    /// Returns true until the subscription has been cancelled.
    fn is_active(&self) -> bool;
}

/// Source of repeating ticks.
pub trait Clock {
    /// Invokes `on_tick` every `interval` until the returned handle is
    /// cancelled. The first tick arrives one full interval after scheduling.
    fn schedule_repeating(&self, interval: Duration, on_tick: TickCallback)
        -> Box<dyn TickSubscription>;
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn schedule_repeating(
        &self,
        interval: Duration,
        on_tick: TickCallback,
    ) -> Box<dyn TickSubscription> {
        (**self).schedule_repeating(interval, on_tick)
    }
}

// ============================================================================
// TokioClock
// ============================================================================

/// Clock backed by a spawned tokio task.
///
/// Must be used from within a tokio runtime. Missed ticks are skipped rather
/// than replayed in a burst.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl TokioClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for TokioClock {
    fn schedule_repeating(
        &self,
        period: Duration,
        mut on_tick: TickCallback,
    ) -> Box<dyn TickSubscription> {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The first tick of an interval completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        debug!("Tick task spawned ({:?} period)", period);
        Box::new(TokioSubscription {
            handle: Some(handle),
        })
    }
}

/// Subscription backed by a spawned tokio task.
#[derive(Debug)]
pub struct TokioSubscription {
    handle: Option<JoinHandle<()>>,
}

impl TickSubscription for TokioSubscription {
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Tick task aborted");
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TokioSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// ManualClock
// ============================================================================

struct ManualEntry {
    interval: Duration,
    active: Arc<AtomicBool>,
    callback: TickCallback,
}

#[derive(Default)]
struct ManualClockInner {
    entries: Mutex<Vec<ManualEntry>>,
    scheduled: AtomicUsize,
}

/// Clock that only ticks when [`ManualClock::advance`] is called.
///
/// Clones share the same set of subscriptions, so a test can keep one clone
/// while the timer owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<ManualClockInner>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires one tick on every active subscription.
    pub fn advance(&self) {
        let mut entries = self.inner.entries.lock().unwrap();
        entries.retain(|entry| entry.active.load(Ordering::SeqCst));
        for entry in entries.iter_mut() {
            (entry.callback)();
        }
    }

    /// Returns the number of subscriptions that have not been cancelled.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.inner
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.active.load(Ordering::SeqCst))
            .count()
    }

    /// Returns how many subscriptions have ever been scheduled.
    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.inner.scheduled.load(Ordering::SeqCst)
    }

    /// Returns the interval of the most recently scheduled active subscription.
    #[must_use]
    pub fn active_interval(&self) -> Option<Duration> {
        self.inner
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|entry| entry.active.load(Ordering::SeqCst))
            .map(|entry| entry.interval)
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("active_subscriptions", &self.active_subscriptions())
            .field("scheduled_count", &self.scheduled_count())
            .finish()
    }
}

impl Clock for ManualClock {
    fn schedule_repeating(
        &self,
        interval: Duration,
        on_tick: TickCallback,
    ) -> Box<dyn TickSubscription> {
        let active = Arc::new(AtomicBool::new(true));
        self.inner.entries.lock().unwrap().push(ManualEntry {
            interval,
            active: Arc::clone(&active),
            callback: on_tick,
        });
        self.inner.scheduled.fetch_add(1, Ordering::SeqCst);

        Box::new(ManualSubscription { active })
    }
}

/// Subscription handed out by [`ManualClock`].
#[derive(Debug)]
pub struct ManualSubscription {
    active: Arc<AtomicBool>,
}

impl TickSubscription for ManualSubscription {
    fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
