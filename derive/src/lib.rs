//! Deterministic identifier derivation.
//!
//! Every id in the system is a lowercase-hex SHA-256 over canonicalized,
//! `|`-joined components. Canonicalization makes the ids stable under the
//! case and whitespace noise that naturally creeps into replicated text:
//! identical claims always hash to the same point id on every replica,
//! independent of who derived them first.

pub mod keys;
pub mod normalize;

pub use keys::{
    derive_aggregate_voter_id, derive_analysis_key, derive_point_id, derive_proof_ref,
    derive_sentiment_event_id, derive_synthesis_point_id, derive_vote_intent_id, Column,
    STORY_ANALYSIS_ARTIFACT_VERSION,
};
pub use normalize::{normalize_hash_token, normalize_point_text};
