//! Logging setup for embedding binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize structured logging to stderr, honoring `RUST_LOG`.
///
/// Falls back to `info` for the platform crates when no filter is set.
/// Safe to call once per process; a second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vinfer_store=info,vinfer_engine=info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
