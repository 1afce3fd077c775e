// src/context.rs

use std::sync::{Arc, RwLock};

use crate::strategies::RateLimitingStrategy;

/// Holds the single active admission strategy and forwards checks to it.
///
/// The context is the long-lived handle embedded in a request path. The
/// strategy behind it can be replaced at runtime without restarting the
/// limiter; replacement discards whatever state the previous strategy had
/// accumulated, counters are never migrated.
#[derive(Debug)]
pub struct LimiterContext {
    active_strategy: RwLock<Arc<dyn RateLimitingStrategy>>,
}

impl LimiterContext {
    /// Creates a context around an initial strategy
    pub fn new(strategy: Arc<dyn RateLimitingStrategy>) -> Self {
        Self {
            active_strategy: RwLock::new(strategy),
        }
    }

    /// Replaces the active strategy.
    ///
    /// Checks already delegated to the previous strategy finish against it;
    /// a check racing the swap may run against either strategy, each of
    /// which stays consistent under its own lock.
    pub fn set_strategy(&self, strategy: Arc<dyn RateLimitingStrategy>) {
        let mut active = self.active_strategy.write().unwrap();
        *active = strategy;
    }

    /// Forwards the admission check to the active strategy.
    pub fn allow_request(&self) -> bool {
        // Clone the handle and release the guard before delegating; the
        // guard is never held across the strategy's own critical section.
        let strategy = Arc::clone(&self.active_strategy.read().unwrap());
        strategy.allow_request()
    }
}
