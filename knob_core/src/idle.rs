//! Activity tracking and idle status-bar decisions.
//!
//! `ActivityClock` is written lock-free from the hardware callback
//! threads (before the event is even queued) and read by the
//! coordinator thread, so a slow speech or network act in the drain
//! path can never delay the record of fresh physical activity.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared record of the most recent input and the status-bar flag.
///
/// `status_bar_active` is the single source of truth consulted by both
/// the 1s idle check and the 5s refresh chain.
#[derive(Debug)]
pub struct ActivityClock {
    epoch: Instant,
    last_input_ms: AtomicU64,
    status_bar_active: AtomicBool,
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_input_ms: AtomicU64::new(0),
            status_bar_active: AtomicBool::new(false),
        }
    }

    /// Record an input at `now` and yield the display back to the user.
    /// Called for every edge, including ones the decoder later suppresses.
    pub fn touch(&self, now: Instant) {
        let ms = now
            .saturating_duration_since(self.epoch)
            .as_millis()
            .min(u128::from(u64::MAX)) as u64;
        self.last_input_ms.store(ms, Ordering::Relaxed);
        self.status_bar_active.store(false, Ordering::Relaxed);
    }

    /// Time with no input as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        let now_ms = now
            .saturating_duration_since(self.epoch)
            .as_millis()
            .min(u128::from(u64::MAX)) as u64;
        Duration::from_millis(now_ms.saturating_sub(self.last_input_ms.load(Ordering::Relaxed)))
    }

    #[inline]
    pub fn status_bar_active(&self) -> bool {
        self.status_bar_active.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_status_bar_active(&self, active: bool) {
        self.status_bar_active.store(active, Ordering::Relaxed);
    }
}

/// Idle check: activate the status bar once the system has been quiet
/// past the threshold and the bar is not already driving the display.
pub fn should_activate(activity: &ActivityClock, threshold: Duration, now: Instant) -> bool {
    activity.idle_for(now) > threshold && !activity.status_bar_active()
}
