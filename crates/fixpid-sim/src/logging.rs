//! Logging setup for simulations and tests.
//!
//! One-call `tracing` subscriber initialization: `RUST_LOG` wins when set,
//! otherwise the supplied default filter applies. Safe to call more than
//! once; later calls are ignored.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber with a compact formatter.
///
/// `default_filter` uses the usual directive syntax, e.g. `"info"` or
/// `"fixpid_sim=debug"`.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init();
}
