// src/strategies/token_bucket.rs

use std::cmp;
use std::sync::Mutex;
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::config::TokenBucketConfig;
use crate::error::Result;
use crate::strategies::RateLimitingStrategy;

/// Token bucket strategy
///
/// Maintains a bucket of tokens that drains by one per admission and is
/// replenished lazily, one token per whole refill interval elapsed since the
/// last refill. The bucket starts full, giving a burst capacity of
/// `capacity` before throttling.
#[derive(Debug)]
pub struct TokenBucketLimiter<C = SystemClock>
where
    C: Clock,
{
    /// Clock supplying "now" for each check
    clock: C,

    /// Configuration for the bucket
    config: TokenBucketConfig,

    /// Mutable bucket state, updated only inside the admission check
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    /// Tokens currently available, always within [0, capacity]
    tokens: u64,

    /// Instant of the last whole-interval refill
    last_refill: Instant,
}

impl TokenBucketLimiter {
    /// Creates a limiter on the system clock
    pub fn new(config: TokenBucketConfig) -> Result<Self> {
        Self::with_clock(SystemClock, config)
    }
}

impl<C> TokenBucketLimiter<C>
where
    C: Clock,
{
    /// Creates a limiter with the given clock and configuration.
    /// The bucket starts full.
    pub fn with_clock(clock: C, config: TokenBucketConfig) -> Result<Self> {
        config.validate()?;
        let state = BucketState {
            tokens: config.capacity,
            last_refill: clock.now(),
        };
        Ok(Self {
            clock,
            config,
            state: Mutex::new(state),
        })
    }

    /// Tokens granted for the elapsed time since the last refill.
    ///
    /// Only whole intervals count; the sub-interval remainder is discarded
    /// rather than carried forward, so the admitted rate drifts slightly
    /// below the idealized continuous-refill rate.
    fn whole_intervals_elapsed(&self, elapsed_nanos: u128) -> u64 {
        let interval_nanos = self.config.refill_interval.as_nanos();
        u64::try_from(elapsed_nanos / interval_nanos).unwrap_or(u64::MAX)
    }
}

impl<C> RateLimitingStrategy for TokenBucketLimiter<C>
where
    C: Clock,
{
    fn allow_request(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();

        let elapsed = now.duration_since(state.last_refill);
        let refilled = self.whole_intervals_elapsed(elapsed.as_nanos());
        if refilled > 0 {
            state.tokens = cmp::min(state.tokens.saturating_add(refilled), self.config.capacity);
            state.last_refill = now;
        }

        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }
}
