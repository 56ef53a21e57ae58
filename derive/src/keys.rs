//! Key derivation functions.
//!
//! Shapes, component order, and the `|` delimiter are wire-compatible
//! contracts: changing any of them partitions existing aggregates.

use crate::normalize::{normalize_hash_token, normalize_point_text};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use venn_types::{Epoch, IntentId, PointId, SynthesisId, TopicId, VoterId};

/// Schema version folded into analysis keys by default.
pub const STORY_ANALYSIS_ARTIFACT_VERSION: &str = "story-analysis-v1";

const DELIMITER: &str = "|";

/// Which synthesis column a point was extracted from.
///
/// The column tag enters the hash verbatim, so frame and reframe points with
/// identical text never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Frame,
    Reframe,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Frame => "frame",
            Column::Reframe => "reframe",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sha256_hex(components: &[&str]) -> String {
    let payload = components.join(DELIMITER);
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// `analysis_key = sha256(story_id | provenance_hash | pipeline_version | model_scope | schema_version)`
pub fn derive_analysis_key(
    story_id: &str,
    provenance_hash: &str,
    pipeline_version: &str,
    model_scope: &str,
    schema_version: Option<&str>,
) -> String {
    let schema_version =
        normalize_hash_token(schema_version.unwrap_or(STORY_ANALYSIS_ARTIFACT_VERSION));
    sha256_hex(&[
        &normalize_hash_token(story_id),
        &normalize_hash_token(provenance_hash),
        &normalize_hash_token(pipeline_version),
        &normalize_hash_token(model_scope),
        &schema_version,
    ])
}

/// `point_id = sha256(analysis_key | column | normalized_text)`
///
/// Legacy per-article scope; superseded by [`derive_synthesis_point_id`] for
/// aggregation but still derivable for old analysis artifacts.
pub fn derive_point_id(analysis_key: &str, column: Column, text: &str) -> PointId {
    PointId::new(sha256_hex(&[
        &normalize_hash_token(analysis_key),
        column.as_str(),
        &normalize_point_text(text),
    ]))
}

/// `synthesis_point_id = sha256(topic_id | synthesis_id | epoch | column | normalized_text)`
///
/// Topic/epoch scope. Deliberately a different component arity than
/// [`derive_point_id`] so the two scopes can never collide for the same
/// conceptual text.
pub fn derive_synthesis_point_id(
    topic_id: &TopicId,
    synthesis_id: &SynthesisId,
    epoch: Epoch,
    column: Column,
    text: &str,
) -> PointId {
    PointId::new(sha256_hex(&[
        &normalize_hash_token(topic_id.as_str()),
        &normalize_hash_token(synthesis_id.as_str()),
        &epoch.value().to_string(),
        column.as_str(),
        &normalize_point_text(text),
    ]))
}

/// `voter_id = sha256(nullifier | topic_id)`, a topic-scoped pseudonym.
pub fn derive_aggregate_voter_id(nullifier: &str, topic_id: &TopicId) -> VoterId {
    VoterId::new(sha256_hex(&[
        &normalize_hash_token(nullifier),
        &normalize_hash_token(topic_id.as_str()),
    ]))
}

/// `event_id = sha256(nullifier | topic_id | synthesis_id | epoch | point_id)`
pub fn derive_sentiment_event_id(
    nullifier: &str,
    topic_id: &TopicId,
    synthesis_id: &SynthesisId,
    epoch: Epoch,
    point_id: &PointId,
) -> String {
    sha256_hex(&[
        &normalize_hash_token(nullifier),
        &normalize_hash_token(topic_id.as_str()),
        &normalize_hash_token(synthesis_id.as_str()),
        &epoch.value().to_string(),
        &normalize_hash_token(point_id.as_str()),
    ])
}

/// `intent_id = sha256(voter_id | topic_id | synthesis_id | epoch | point_id)`
///
/// The idempotency key for vote intents: not a function of the agreement
/// value or of time, so resubmission replaces instead of accumulating.
pub fn derive_vote_intent_id(
    voter_id: &VoterId,
    topic_id: &TopicId,
    synthesis_id: &SynthesisId,
    epoch: Epoch,
    point_id: &PointId,
) -> IntentId {
    IntentId::new(sha256_hex(&[
        &normalize_hash_token(voter_id.as_str()),
        &normalize_hash_token(topic_id.as_str()),
        &normalize_hash_token(synthesis_id.as_str()),
        &epoch.value().to_string(),
        &normalize_hash_token(point_id.as_str()),
    ]))
}

/// Opaque reference to a constituency proof: a digest, never the proof
/// itself, so it is safe to carry on intent records.
pub fn derive_proof_ref(district_hash: &str, nullifier: &str, merkle_root: &str) -> String {
    sha256_hex(&[
        &normalize_hash_token(district_hash),
        &normalize_hash_token(nullifier),
        &normalize_hash_token(merkle_root),
    ])
}
