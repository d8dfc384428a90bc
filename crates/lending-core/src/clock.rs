//! Time source consulted once per operation.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Current unix timestamp in seconds
    fn unix_timestamp(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock for simulations and tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn set(&self, timestamp: u64) {
        self.now.set(timestamp);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get().saturating_add(seconds));
    }
}

impl Clock for ManualClock {
    fn unix_timestamp(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(60);
        assert_eq!(clock.unix_timestamp(), 1_060);
        clock.set(5);
        assert_eq!(clock.unix_timestamp(), 5);

        assert!(SystemClock.unix_timestamp() > 1_600_000_000);
    }
}
