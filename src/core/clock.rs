//! Monotonic timer service
//!
//! The manager and activities compare wall-clock deadlines against a shared clock.
//! Production code uses [`SystemClock`]; tests and the simulator drive a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::core::types::Seconds;

/// Source of monotonic time in seconds
pub trait Clock {
    fn now_secs(&self) -> Seconds;
}

/// Clock backed by `Instant`, starting at zero when created
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> Seconds {
        self.start.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Seconds>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(secs: Seconds) -> Self {
        let clock = Self::new();
        clock.set(secs);
        clock
    }

    pub fn advance(&self, secs: Seconds) {
        self.now.set(self.now.get() + secs);
    }

    /// Time never runs backwards; earlier values are ignored
    pub fn set(&self, secs: Seconds) {
        if secs >= self.now.get() {
            self.now.set(secs);
        }
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> Seconds {
        self.now.get()
    }
}
