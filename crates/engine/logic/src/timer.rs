//! Map timers used as rule operands

use serde::{Deserialize, Serialize};

/// One-shot timer measured against the engine clock
///
/// A start time of `0.0` means the timer is not running.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timer {
    init_time: f64,
    delay: f64,
}

impl Timer {
    /// Create a stopped timer with the given delay in seconds
    pub fn new(delay: f64) -> Self {
        Timer {
            init_time: 0.0,
            delay,
        }
    }

    /// Get the delay in seconds
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Start (or restart) the timer at `now`
    pub fn start(&mut self, now: f64) {
        self.init_time = now;
    }

    /// Stop the timer
    pub fn stop(&mut self) {
        self.init_time = 0.0;
    }

    /// Check whether the timer is running
    pub fn is_started(&self) -> bool {
        self.init_time != 0.0
    }

    /// Check whether the delay has elapsed at `now`
    pub fn is_expired(&self, now: f64) -> bool {
        self.is_started() && self.init_time + self.delay <= now
    }
}
