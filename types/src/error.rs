//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the Venn sentiment protocol.
///
/// Admission denials are *not* errors; they are receipts with
/// `accepted: false` and a stable reason string. This enum covers the
/// machinery failures: schema violations, transport trouble, storage loss.
#[derive(Debug, Error)]
pub enum VennError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("mesh transport error: {0}")]
    Mesh(String),

    #[error("budget error: {0}")]
    Budget(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}
