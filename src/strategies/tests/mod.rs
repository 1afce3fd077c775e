// src/strategies/tests/mod.rs

/// Tests for the sliding window log strategy
mod sliding_window_tests;
