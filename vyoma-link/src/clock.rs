//! Injectable clock for scheduled emission loops
//!
//! The actuator and mode-settle waits sleep through this trait so tests
//! can simulate tick progression without real-time delays.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sleep dependency for tick-paced loops
pub trait Clock: Send {
    /// Block for the given duration
    fn sleep(&self, duration: Duration);
}

/// Real clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Mock clock for unit testing: returns immediately and records every
/// requested sleep
///
/// Clones share the same log, so a test can keep one handle while the
/// loop under test owns the other.
#[derive(Clone, Default)]
pub struct MockClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    /// Create a new mock clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps requested so far
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }

    /// Total time the loop would have slept
    pub fn total_slept(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Clock for MockClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_records_sleeps() {
        let clock = MockClock::new();
        clock.sleep(Duration::from_millis(100));
        clock.sleep(Duration::from_millis(50));
        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_slept(), Duration::from_millis(150));
    }
}
