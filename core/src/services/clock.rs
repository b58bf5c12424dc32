//! Time source abstraction for expiry and transition decisions.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant
///
/// Every time-dependent decision in the rotation flow reads this trait
/// instead of the ambient system clock, so expiry and retention can be
/// driven deterministically in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that moves only when told to
///
/// Clones share the same underlying instant: advancing one handle is
/// observed by every holder.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a manual clock frozen at the given instant
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(RwLock::new(start)),
        }
    }

    /// Sets the clock to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.write().unwrap() = instant;
    }

    /// Moves the clock forward by the given duration
    pub fn advance(&self, delta: Duration) {
        let mut current = self.current.write().unwrap();
        *current = *current + delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap()
    }
}
