// src/bin/admission_bench.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use futures::future::join_all;
use indicatif::ProgressBar;
use prettytable::{row, Table};
use structopt::StructOpt;
use tokio::sync::Barrier;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use admission_control::config::{SlidingWindowConfig, TokenBucketConfig};
use admission_control::error::AdmissionError;
use admission_control::strategies::{
    RateLimitingStrategy, SlidingWindowLimiter, TokenBucketLimiter,
};
use admission_control::LimiterContext;

#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "admission_bench",
    about = "A benchmarking tool for admission control strategies"
)]
struct Opt {
    /// Strategy to benchmark
    #[structopt(short, long, possible_values = &["sliding_window", "token_bucket", "all"], default_value = "all")]
    strategy: String,

    /// Maximum admissions per window (sliding window)
    #[structopt(short, long, default_value = "1000")]
    limit: u64,

    /// Window duration in seconds (sliding window)
    #[structopt(short, long, default_value = "60")]
    window_seconds: u64,

    /// Bucket capacity (token bucket)
    #[structopt(long, default_value = "1000")]
    capacity: u64,

    /// Refill interval in milliseconds (token bucket)
    #[structopt(long, default_value = "50")]
    refill_interval_ms: u64,

    /// Number of concurrent workers
    #[structopt(short = "u", long, default_value = "10")]
    num_workers: usize,

    /// Number of requests per worker
    #[structopt(short = "r", long, default_value = "100")]
    requests_per_worker: usize,

    /// Number of iterations to run
    #[structopt(short, long, default_value = "3")]
    iterations: usize,

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
                "admission_bench={},admission_control={}",
                log_level, log_level
            )))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(
                "admission_bench=error,admission_control=error",
            ))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    let run_id = Uuid::new_v4();
    if !opt.disable_logs {
        info!(
            run_id = %run_id,
            started_at = %Local::now().format("%Y-%m-%d %H:%M:%S"),
            "Benchmark starting"
        );
    }

    // Determine which strategies to benchmark
    let strategies = if opt.strategy == "all" {
        vec!["sliding_window", "token_bucket"]
    } else {
        vec![opt.strategy.as_str()]
    };

    for name in strategies {
        benchmark_strategy(name, &opt).await?;
    }

    Ok(())
}

fn build_strategy(name: &str, opt: &Opt) -> Result<Arc<dyn RateLimitingStrategy>, AdmissionError> {
    match name {
        "sliding_window" => Ok(Arc::new(SlidingWindowLimiter::new(
            SlidingWindowConfig::new(opt.limit, Duration::from_secs(opt.window_seconds)),
        )?)),
        "token_bucket" => Ok(Arc::new(TokenBucketLimiter::new(TokenBucketConfig::new(
            opt.capacity,
            Duration::from_millis(opt.refill_interval_ms),
        ))?)),
        other => Err(AdmissionError::Config(format!(
            "Unknown strategy: {}",
            other
        ))),
    }
}

async fn benchmark_strategy(name: &str, opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    if !opt.disable_logs {
        info!(
            "Benchmarking {} with {} workers x {} requests",
            name, opt.num_workers, opt.requests_per_worker
        );
    }

    let total_requests = opt.num_workers * opt.requests_per_worker;
    let mut table = Table::new();
    table.add_row(row![
        "Iteration",
        "Requests",
        "Allowed",
        "Rejected",
        "Elapsed (ms)",
        "Req/s"
    ]);

    for iteration in 1..=opt.iterations {
        // A fresh context per iteration so earlier bursts don't bleed in
        let context = Arc::new(LimiterContext::new(build_strategy(name, opt)?));
        let barrier = Arc::new(Barrier::new(opt.num_workers + 1));
        let progress = ProgressBar::new(total_requests as u64);

        let mut handles = Vec::with_capacity(opt.num_workers);
        for _ in 0..opt.num_workers {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            let progress = progress.clone();
            let requests = opt.requests_per_worker;

            handles.push(tokio::spawn(async move {
                // Wait for all workers to be ready
                barrier.wait().await;

                let mut allowed = 0usize;
                for _ in 0..requests {
                    if context.allow_request() {
                        allowed += 1;
                    }
                    progress.inc(1);
                }
                allowed
            }));
        }

        barrier.wait().await;
        let start_time = Instant::now();
        let results = join_all(handles).await;
        let elapsed = start_time.elapsed();
        progress.finish_and_clear();

        let allowed: usize = results
            .into_iter()
            .map(|result| result.expect("benchmark worker panicked"))
            .sum();
        let rejected = total_requests - allowed;
        let rps = total_requests as f64 / elapsed.as_secs_f64();

        table.add_row(row![
            iteration,
            total_requests,
            allowed,
            rejected,
            format!("{:.2}", elapsed.as_secs_f64() * 1000.0),
            format!("{:.0}", rps)
        ]);
    }

    println!("\nResults for {}:", name);
    table.printstd();

    Ok(())
}
