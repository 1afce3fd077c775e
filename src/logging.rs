use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Ensure initialization happens only once
static INIT: Once = Once::new();

/// Initialize the logging system with sensible defaults.
///
/// Log level can be set using the RUST_LOG environment variable.
/// Example: RUST_LOG=debug,admission_control=trace
pub fn init() {
    INIT.call_once(|| {
        // Default to 'info' level if RUST_LOG is not set
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true), // Useful for debugging concurrency issues
            )
            .init();

        tracing::info!("Logging initialized");
    });
}

/// Macro for logging admission decisions at the call site.
///
/// The strategies themselves stay silent; callers embedding a limiter in a
/// request path use this to record each verdict.
#[macro_export]
macro_rules! admission_event {
    ($strategy:expr, $allowed:expr) => {
        tracing::info!(strategy = $strategy, allowed = $allowed, "Admission decision")
    };
    ($strategy:expr, $allowed:expr, $bound:expr) => {
        tracing::info!(
            strategy = $strategy,
            allowed = $allowed,
            bound = $bound,
            "Admission decision"
        )
    };
}
