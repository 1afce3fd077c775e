// library entry
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod strategies;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export key components for convenience
pub use clock::{Clock, SystemClock};
pub use config::{SlidingWindowConfig, StrategyConfig, TokenBucketConfig};
pub use context::LimiterContext;
pub use error::{AdmissionError, Result};
pub use logging::init as init_logging;
pub use strategies::{RateLimitingStrategy, SlidingWindowLimiter, TokenBucketLimiter};
