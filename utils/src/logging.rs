//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    // Default to info so replay/read telemetry is visible out of the box.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber with sensible defaults.
///
/// Respects the `RUST_LOG` environment variable for filtering. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init();
}

/// Like [`init_tracing`], but emitting one JSON object per line for log
/// shippers.
pub fn init_tracing_json() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .try_init();
}
