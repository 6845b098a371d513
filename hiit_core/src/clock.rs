//! Time sources for the driving layer.
//!
//! The engine itself takes `now` as an argument on every call; only the
//! driver owns a clock.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Supplies the current time. Must be consistent within one run.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for simulation and tests.
///
/// Clones share the same underlying time, so a test can keep one handle
/// while a driver owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + Duration::seconds(secs));
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Whole seconds between two instants, zero if `later` is not after `earlier`
pub fn whole_seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> u32 {
    let secs = (later - earlier).num_seconds();
    u32::try_from(secs.max(0)).unwrap_or(u32::MAX)
}
