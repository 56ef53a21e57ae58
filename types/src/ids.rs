//! Derived identifier types.
//!
//! All of these wrap a lowercase-hex SHA-256 digest (or, for externally
//! supplied ids, an opaque stable string). They are plain string wrappers so
//! that replicated payloads round-trip without re-encoding; derivation and
//! normalization rules live in `venn-derive`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opinion-bearing subject. Externally created, immutable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

/// A versioned snapshot of synthesized coverage for a topic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynthesisId(String);

/// A normalized claim (frame or reframe) that can be voted on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

/// A pseudonymous, topic-scoped voter identity.
///
/// Derived as `sha256(nullifier, topic_id)` so a single real identity cannot
/// be correlated across topics from the id alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

/// Idempotency key for a vote intent record.
///
/// A function of `(voter_id, topic_id, synthesis_id, epoch, point_id)` only,
/// never of the agreement value or time, so resubmitting the same tuple
/// overwrites rather than accumulates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

impl_id!(TopicId);
impl_id!(SynthesisId);
impl_id!(PointId);
impl_id!(VoterId);
impl_id!(IntentId);
