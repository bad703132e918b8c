//! Tracing setup for tests
//!
//! Call [`init_tracing`] at the top of a test to see repository spans.
//! Output is filtered by `RUST_LOG` (default `warn`) and captured by the
//! test harness.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another test binary may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Installs a global fmt subscriber once per test process
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
