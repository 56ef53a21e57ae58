//! Shared utilities: logging setup and retry schedules.

pub mod backoff;
pub mod logging;

pub use backoff::{retry_delay, RETRY_DELAYS_MS};
pub use logging::{init_tracing, init_tracing_json};
