//! Progress notification throttling
//!
//! Lines can be produced far faster than anyone wants to hear about them.
//! [`ProgressThrottle`] lets a notification through only when the configured
//! interval has elapsed since the run started or since the previous one.

use std::time::{Duration, Instant};

use crate::constants::DEFAULT_PROGRESS_INTERVAL;

/// Rate limiter for progress notifications
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Instant,
    emitted: usize,
}

impl ProgressThrottle {
    /// Create a throttle whose first window starts now
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Create a throttle whose first window starts at `start`
    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
            emitted: 0,
        }
    }

    /// Whether a notification may be sent now; records it if so
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    /// Whether a notification may be sent at `now`; records it if so
    pub fn ready_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        self.emitted += 1;
        true
    }

    /// Notifications let through so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
