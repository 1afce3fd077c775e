// src/test_utils.rs

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::strategies::RateLimitingStrategy;

/// Advanceable clock for driving strategies through simulated time.
///
/// Clones share the same underlying instant, so a test keeps one handle for
/// `advance` while the strategy under test owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current_time: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves simulated time forward
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

/// Drives a strategy through a schedule of call offsets measured from the
/// start of the scenario, returning the decision for each call in order.
pub fn run_admission_schedule<S>(
    strategy: &S,
    clock: &ManualClock,
    offsets: &[Duration],
) -> Vec<bool>
where
    S: RateLimitingStrategy,
{
    let start = clock.now();
    offsets
        .iter()
        .map(|offset| {
            let target = start + *offset;
            let now = clock.now();
            if target > now {
                clock.advance(target - now);
            }
            strategy.allow_request()
        })
        .collect()
}

/// Convenience for second-granularity schedules
pub fn at_secs(secs: &[u64]) -> Vec<Duration> {
    secs.iter().map(|s| Duration::from_secs(*s)).collect()
}
