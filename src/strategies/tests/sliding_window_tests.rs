// src/strategies/tests/sliding_window_tests.rs

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::config::SlidingWindowConfig;
use crate::error::AdmissionError;
use crate::strategies::{RateLimitingStrategy, SlidingWindowLimiter};
use crate::test_utils::{at_secs, run_admission_schedule, ManualClock};

/// Three slots, five second window: the first three calls fill the window,
/// and none of them has aged out by t=5 (age exactly five seconds is still
/// inside the window), so no slot frees up.
#[test]
fn test_window_fills_and_stays_full() {
    let clock = ManualClock::new();
    let config = SlidingWindowConfig::new(3, Duration::from_secs(5));
    let limiter = SlidingWindowLimiter::with_clock(clock.clone(), config).unwrap();

    let decisions = run_admission_schedule(&limiter, &clock, &at_secs(&[0, 1, 2, 3, 4, 5]));
    assert_eq!(
        decisions,
        vec![true, true, true, false, false, false],
        "first three requests fill the window, the rest are rejected"
    );
}

/// One second later the t=0 entry is six seconds old, gets evicted, and a
/// slot frees up.
#[test]
fn test_oldest_entry_evicted_after_window() {
    let clock = ManualClock::new();
    let config = SlidingWindowConfig::new(3, Duration::from_secs(5));
    let limiter = SlidingWindowLimiter::with_clock(clock.clone(), config).unwrap();

    let decisions = run_admission_schedule(&limiter, &clock, &at_secs(&[0, 1, 2, 3, 4, 5, 6]));
    assert_eq!(
        decisions.last(),
        Some(&true),
        "request at t=6 should be admitted once the t=0 entry ages out"
    );
}

/// The window edge is inclusive: an entry aged exactly one window still
/// blocks a full window, and only a strictly older entry is purged.
#[test]
fn test_entry_at_exact_window_age_still_counts() {
    let clock = ManualClock::new();
    let config = SlidingWindowConfig::new(1, Duration::from_secs(5));
    let limiter = SlidingWindowLimiter::with_clock(clock.clone(), config).unwrap();

    assert!(limiter.allow_request(), "first request fills the window");

    clock.advance(Duration::from_secs(5));
    assert!(
        !limiter.allow_request(),
        "entry aged exactly one window must still be counted"
    );

    clock.advance(Duration::from_millis(1));
    assert!(
        limiter.allow_request(),
        "entry strictly older than the window must be evicted"
    );
}

/// For every call instant t, the number of admitted timestamps within one
/// window of t never exceeds the limit, over an irregular schedule.
#[test]
fn test_admissions_inside_any_window_never_exceed_limit() {
    let clock = ManualClock::new();
    let window_secs = 10u64;
    let limit = 3u64;
    let config = SlidingWindowConfig::new(limit, Duration::from_secs(window_secs));
    let limiter = SlidingWindowLimiter::with_clock(clock.clone(), config).unwrap();

    let schedule = [0, 1, 1, 2, 4, 7, 9, 10, 11, 12, 13, 15, 20, 21, 22, 23, 24, 30];
    let decisions = run_admission_schedule(&limiter, &clock, &at_secs(&schedule));

    let admitted: Vec<u64> = schedule
        .iter()
        .zip(decisions.iter())
        .filter(|(_, allowed)| **allowed)
        .map(|(t, _)| *t)
        .collect();

    for &t in &schedule {
        let in_window = admitted
            .iter()
            .filter(|&&s| s <= t && t - s <= window_secs)
            .count() as u64;
        assert!(
            in_window <= limit,
            "admissions within {}s of t={} reached {}, exceeding limit {}",
            window_secs,
            t,
            in_window,
            limit
        );
    }
}

/// Rejected calls must not append to the log. If they did, the entries added
/// at t=1 would still occupy the window at t=6 and block admission.
#[test]
fn test_rejection_does_not_mutate_log() {
    let clock = ManualClock::new();
    let config = SlidingWindowConfig::new(2, Duration::from_secs(5));
    let limiter = SlidingWindowLimiter::with_clock(clock.clone(), config).unwrap();

    assert!(limiter.allow_request());
    assert!(limiter.allow_request());

    clock.advance(Duration::from_secs(1));
    for _ in 0..5 {
        assert!(!limiter.allow_request(), "window is full at t=1");
    }

    // Only the two t=0 admissions occupy the log; both age out by t=6.
    clock.advance(Duration::from_secs(5));
    assert!(limiter.allow_request());
    assert!(limiter.allow_request());
    assert!(
        !limiter.allow_request(),
        "exactly two slots free up, so the third request is rejected"
    );
}

/// Concurrent burst against one instance admits exactly `limit` requests.
#[test]
fn test_concurrent_burst_admits_exactly_limit() {
    let config = SlidingWindowConfig::new(5, Duration::from_secs(60));
    let limiter = Arc::new(SlidingWindowLimiter::new(config).unwrap());

    let barrier = Arc::new(Barrier::new(20));
    let mut handles = Vec::with_capacity(20);

    for _ in 0..20 {
        let limiter = Arc::clone(&limiter);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            limiter.allow_request()
        }));
    }

    let allowed = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|allowed| *allowed)
        .count();

    assert_eq!(
        allowed, 5,
        "expected exactly 5 out of 20 concurrent requests to be admitted"
    );
}

#[test]
fn test_zero_limit_rejected_at_construction() {
    let result = SlidingWindowLimiter::new(SlidingWindowConfig::new(0, Duration::from_secs(5)));
    assert!(matches!(result, Err(AdmissionError::InvalidLimit(_))));
}

#[test]
fn test_zero_window_rejected_at_construction() {
    let result = SlidingWindowLimiter::new(SlidingWindowConfig::new(3, Duration::ZERO));
    assert!(matches!(result, Err(AdmissionError::InvalidDuration(_))));
}
