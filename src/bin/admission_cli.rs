// src/bin/admission_cli.rs

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use structopt::StructOpt;
use tokio::time;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use admission_control::admission_event;
use admission_control::config::{SlidingWindowConfig, StrategyConfig, TokenBucketConfig};
use admission_control::error::AdmissionError;
use admission_control::strategies::RateLimitingStrategy;
use admission_control::LimiterContext;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "admission_cli",
    about = "A CLI for exercising admission control strategies"
)]
struct Opt {
    /// Admission strategy to use
    #[structopt(short, long, possible_values = &["sliding_window", "token_bucket"], default_value = "sliding_window")]
    strategy: String,

    /// Maximum admissions per window (sliding window)
    #[structopt(short, long, default_value = "3")]
    limit: u64,

    /// Window duration in seconds (sliding window)
    #[structopt(short, long, default_value = "5")]
    window_seconds: u64,

    /// Bucket capacity (token bucket)
    #[structopt(long, default_value = "3")]
    capacity: u64,

    /// Refill interval in milliseconds (token bucket)
    #[structopt(long, default_value = "2000")]
    refill_interval_ms: u64,

    /// Load the strategy from a JSON configuration file instead of flags
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Arrival pattern
    #[structopt(long, possible_values = &["burst", "steady", "random"], default_value = "steady")]
    simulation: String,

    /// Number of requests to simulate
    #[structopt(short = "n", long, default_value = "10")]
    num_requests: usize,

    /// Time between requests in milliseconds (steady and random modes)
    #[structopt(short = "t", long, default_value = "1000")]
    request_interval_ms: u64,

    /// Swap to the other strategy after this many requests
    #[structopt(long)]
    swap_after: Option<usize>,

    /// Strategy to swap to (requires --swap-after)
    #[structopt(long, possible_values = &["sliding_window", "token_bucket"])]
    swap_to: Option<String>,

    /// Verbosity level
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Disable logs
    #[structopt(long)]
    disable_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let opt = Opt::from_args();

    // Set up logging based on disable_logs flag
    if !opt.disable_logs {
        let log_level = match opt.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(format!(
                "admission_cli={},admission_control={}",
                log_level, log_level
            )))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    } else {
        // Set up minimal logging (errors only)
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(
                "admission_cli=error,admission_control=error",
            ))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    let (mut strategy_name, initial) = build_initial_strategy(&opt)?;
    let context = LimiterContext::new(initial);

    if !opt.disable_logs {
        info!(
            strategy = strategy_name.as_str(),
            simulation = opt.simulation.as_str(),
            "Starting admission simulation"
        );
    }

    // Allow Ctrl-C to stop the run early; the summary is still printed.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .expect("Failed to set Ctrl-C handler");
    }

    let mut allowed_count = 0usize;
    let mut denied_count = 0usize;
    let start_time = Instant::now();

    for i in 1..=opt.num_requests {
        if !running.load(Ordering::SeqCst) {
            warn!("Interrupted after {} requests", i - 1);
            break;
        }

        if opt.swap_after == Some(i) {
            if let Some(name) = &opt.swap_to {
                context.set_strategy(strategy_from_flags(name, &opt)?);
                strategy_name = name.clone();
                if !opt.disable_logs {
                    info!(
                        strategy = strategy_name.as_str(),
                        "Strategy swapped at runtime"
                    );
                }
            }
        }

        let allowed = context.allow_request();
        if allowed {
            allowed_count += 1;
        } else {
            denied_count += 1;
        }
        admission_event!(strategy_name.as_str(), allowed);
        println!(
            "Request {}: {}",
            i,
            if allowed { "allowed" } else { "rejected" }
        );

        match opt.simulation.as_str() {
            "burst" => {}
            "steady" => time::sleep(Duration::from_millis(opt.request_interval_ms)).await,
            _ => {
                // Uniform jitter in [0, 2 * interval)
                let jitter = rand::random::<f64>() * 2.0;
                let pause = (opt.request_interval_ms as f64 * jitter) as u64;
                time::sleep(Duration::from_millis(pause)).await;
            }
        }
    }

    let elapsed = start_time.elapsed();

    println!("\nSimulation Results:");
    println!("-------------------");
    println!("Strategy: {}", strategy_name);
    println!("Allowed: {}", allowed_count);
    println!("Rejected: {}", denied_count);
    println!("Time elapsed: {:?}", elapsed);

    Ok(())
}

/// Builds the starting strategy from a config file when given, flags otherwise.
fn build_initial_strategy(
    opt: &Opt,
) -> Result<(String, Arc<dyn RateLimitingStrategy>), AdmissionError> {
    if let Some(path) = &opt.config {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AdmissionError::Config(format!("failed to read {}: {}", path.display(), err))
        })?;
        let config: StrategyConfig = serde_json::from_str(&raw)?;
        let strategy = config.build()?;
        return Ok((config.strategy_name().to_string(), strategy));
    }
    let strategy = strategy_from_flags(&opt.strategy, opt)?;
    Ok((opt.strategy.clone(), strategy))
}

fn strategy_from_flags(
    name: &str,
    opt: &Opt,
) -> Result<Arc<dyn RateLimitingStrategy>, AdmissionError> {
    let config = match name {
        "sliding_window" => StrategyConfig::SlidingWindow(SlidingWindowConfig::new(
            opt.limit,
            Duration::from_secs(opt.window_seconds),
        )),
        "token_bucket" => StrategyConfig::TokenBucket(TokenBucketConfig::new(
            opt.capacity,
            Duration::from_millis(opt.refill_interval_ms),
        )),
        other => {
            return Err(AdmissionError::Config(format!(
                "Unknown strategy: {}",
                other
            )))
        }
    };
    config.build()
}
