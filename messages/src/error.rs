//! Schema hydration errors.

use thiserror::Error;
use venn_types::VennError;

/// Why a replicated payload failed to hydrate.
///
/// Hydration callers treat any of these as "payload absent": the value is
/// dropped and logged, never surfaced to the user (taxonomy: validation
/// errors are recoverable by ignoring the payload).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A public aggregate payload carried identity material.
    #[error("payload rejected: forbidden field `{0}`")]
    ForbiddenField(String),

    /// A field violated a range or emptiness rule.
    #[error("invalid payload: {0}")]
    Invalid(String),

    /// Structurally malformed: wrong shape, wrong types, unknown fields.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<SchemaError> for VennError {
    fn from(err: SchemaError) -> Self {
        VennError::Schema(err.to_string())
    }
}
