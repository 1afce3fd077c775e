// src/config/mod.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AdmissionError, Result};
use crate::strategies::{RateLimitingStrategy, SlidingWindowLimiter, TokenBucketLimiter};

/// Configuration for the sliding window log strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidingWindowConfig {
    /// Maximum number of admissions inside the trailing window
    pub limit: u64,

    /// Window duration
    #[serde(with = "duration_serde")]
    pub window: Duration,
}

impl SlidingWindowConfig {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self { limit, window }
    }

    /// Rejects misconfiguration eagerly, before the limiter is built
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(AdmissionError::InvalidLimit(
                "sliding window limit must be greater than zero".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(AdmissionError::InvalidDuration(
                "sliding window duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the token bucket strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBucketConfig {
    /// Maximum number of tokens the bucket can hold
    pub capacity: u64,

    /// One token is granted per whole interval elapsed
    #[serde(with = "duration_serde")]
    pub refill_interval: Duration,
}

impl TokenBucketConfig {
    pub fn new(capacity: u64, refill_interval: Duration) -> Self {
        Self {
            capacity,
            refill_interval,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(AdmissionError::InvalidLimit(
                "token bucket capacity must be greater than zero".to_string(),
            ));
        }
        if self.refill_interval.is_zero() {
            return Err(AdmissionError::InvalidDuration(
                "token bucket refill interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Strategy selection as it appears in configuration files.
///
/// Tagged by a `strategy` field so a JSON document reads as
/// `{"strategy": "token_bucket", "capacity": 3, "refill_interval": 2000}`.
/// Durations are expressed in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    SlidingWindow(SlidingWindowConfig),
    TokenBucket(TokenBucketConfig),
}

impl StrategyConfig {
    /// Validates and constructs the configured strategy on the system clock
    pub fn build(&self) -> Result<Arc<dyn RateLimitingStrategy>> {
        match self {
            StrategyConfig::SlidingWindow(config) => {
                Ok(Arc::new(SlidingWindowLimiter::new(config.clone())?))
            }
            StrategyConfig::TokenBucket(config) => {
                Ok(Arc::new(TokenBucketLimiter::new(config.clone())?))
            }
        }
    }

    /// Name used in logs and CLI output
    pub fn strategy_name(&self) -> &'static str {
        match self {
            StrategyConfig::SlidingWindow(_) => "sliding_window",
            StrategyConfig::TokenBucket(_) => "token_bucket",
        }
    }
}

// Helper module to serialize/deserialize Duration with serde
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
