//! Canonicalization rules for hash inputs.

/// Canonical form for id-like tokens: trimmed and lowercased.
pub fn normalize_hash_token(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Canonical form for point text: trimmed, lowercased, and with every
/// internal whitespace run collapsed to a single space.
///
/// Point text comes out of an LLM synthesis pipeline, so the same claim can
/// arrive with different spacing on different replicas; this is what keeps
/// the derived point id stable across them.
pub fn normalize_point_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
