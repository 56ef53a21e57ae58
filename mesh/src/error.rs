use std::time::Duration;
use thiserror::Error;
use venn_types::VennError;

#[derive(Debug, Error)]
pub enum MeshError {
    /// The transport accepted the write but no ack arrived in time.
    /// The write may still have propagated; callers decide whether to
    /// recover (voter nodes) or proceed best-effort (snapshots).
    #[error("aggregate-put-ack-timeout after {0:?}")]
    AckTimeout(Duration),

    /// A read exceeded its latency budget. Treated as "absent".
    #[error("read budget of {budget:?} exhausted at {path}")]
    ReadTimeout { path: String, budget: Duration },

    /// The transport reported a hard failure for a write.
    #[error("transport error: {0}")]
    Transport(String),

    /// An outbound payload failed the privacy guard or schema check.
    #[error("outbound payload rejected: {0}")]
    Rejected(String),

    /// A path segment was empty or contained a separator.
    #[error("invalid mesh path segment: {0:?}")]
    InvalidPath(String),
}

impl From<MeshError> for VennError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::Rejected(reason) => VennError::Schema(reason),
            other => VennError::Mesh(other.to_string()),
        }
    }
}
