use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::Timestamp;

/// Source of the current time, in microseconds.
///
/// Injected into [`RateLimiter`](crate::RateLimiter) so the sliding window
/// can be driven deterministically in tests; production code uses
/// [`SystemClock`].
pub trait Clock: Send + Sync {
    /// Current time as a [`Timestamp`].
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in microseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time is before the Unix epoch");

        since_epoch.as_micros() as Timestamp
    }
}

/// A clock that only moves when told to.
///
/// Intended for tests: construct it at a starting timestamp, then
/// [`advance`](ManualClock::advance) or [`set`](ManualClock::set) it between
/// checks. Safe to share across tasks.
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            micros: AtomicI64::new(start),
        }
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        self.micros.fetch_add(step.as_micros() as i64, Ordering::Relaxed);
    }

    /// Jump the clock to an absolute timestamp.
    pub fn set(&self, timestamp: Timestamp) {
        self.micros.store(timestamp, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.micros.load(Ordering::Relaxed)
    }
}
