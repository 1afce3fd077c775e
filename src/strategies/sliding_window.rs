// src/strategies/sliding_window.rs

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::config::SlidingWindowConfig;
use crate::error::Result;
use crate::strategies::RateLimitingStrategy;

/// Sliding window log strategy
///
/// Keeps the exact timestamps of recent admissions and counts how many fall
/// inside a trailing window. Once the window holds `limit` admissions, new
/// requests are rejected until the oldest entry ages out.
#[derive(Debug)]
pub struct SlidingWindowLimiter<C = SystemClock>
where
    C: Clock,
{
    /// Clock supplying "now" for each check
    clock: C,

    /// Configuration for the window
    config: SlidingWindowConfig,

    /// Admission instants, oldest first; insertion order is chronological
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter on the system clock
    pub fn new(config: SlidingWindowConfig) -> Result<Self> {
        Self::with_clock(SystemClock, config)
    }
}

impl<C> SlidingWindowLimiter<C>
where
    C: Clock,
{
    /// Creates a limiter with the given clock and configuration
    pub fn with_clock(clock: C, config: SlidingWindowConfig) -> Result<Self> {
        config.validate()?;
        let timestamps = VecDeque::with_capacity(config.limit.min(1024) as usize);
        Ok(Self {
            clock,
            config,
            timestamps: Mutex::new(timestamps),
        })
    }
}

impl<C> RateLimitingStrategy for SlidingWindowLimiter<C>
where
    C: Clock,
{
    fn allow_request(&self) -> bool {
        let now = self.clock.now();
        let mut timestamps = self.timestamps.lock().unwrap();

        // An entry aged exactly one window is still inside it; only strictly
        // older entries leave. Timestamps arrive in order, so purging from
        // the front is enough and the log never needs re-sorting.
        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) > self.config.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if (timestamps.len() as u64) < self.config.limit {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }
}
