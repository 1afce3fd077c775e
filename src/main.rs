use dotenv::dotenv;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use admission_control::admission_event;
use admission_control::{
    init_logging, LimiterContext, SlidingWindowConfig, SlidingWindowLimiter, TokenBucketConfig,
    TokenBucketLimiter,
};

fn main() -> admission_control::Result<()> {
    dotenv().ok();
    init_logging();
    info!("Admission control demo starting up");

    println!("Using sliding window limiter:");
    let window = SlidingWindowLimiter::new(SlidingWindowConfig::new(3, Duration::from_secs(5)))?;
    let context = LimiterContext::new(Arc::new(window));
    for i in 1..=6 {
        let allowed = context.allow_request();
        admission_event!("sliding_window", allowed, 3u64);
        println!("Request {}: {}", i, allowed);
        thread::sleep(Duration::from_secs(1));
    }

    println!("\nSwitching to token bucket limiter:");
    let bucket = TokenBucketLimiter::new(TokenBucketConfig::new(3, Duration::from_secs(2)))?;
    context.set_strategy(Arc::new(bucket));
    for i in 1..=10 {
        let allowed = context.allow_request();
        admission_event!("token_bucket", allowed, 3u64);
        println!("Request {}: {}", i, allowed);
        thread::sleep(Duration::from_millis(500));
    }

    info!(operation = "shutdown", "Admission control demo finished");
    Ok(())
}
