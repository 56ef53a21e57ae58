use thiserror::Error;
use venn_types::{BudgetError, VennError};

/// Local persistence failures for the intent queue.
///
/// These never abort a vote: the queue degrades to in-memory state and the
/// failure is logged once.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("queue storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Internal admission failures.
///
/// Denials are not errors: a denied vote yields an `accepted: false` receipt.
/// This enum covers invariant breaks only, e.g. a budget ledger that rejects
/// a well-formed date.
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
}

impl From<SentimentError> for VennError {
    fn from(err: SentimentError) -> Self {
        match err {
            SentimentError::Budget(inner) => VennError::Budget(inner.to_string()),
        }
    }
}

impl From<StorageError> for VennError {
    fn from(err: StorageError) -> Self {
        VennError::Storage(err.to_string())
    }
}
