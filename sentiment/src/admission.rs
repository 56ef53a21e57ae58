//! Admission policy: toggle law, proof policy, weight clamping.

use serde::{Deserialize, Serialize};
use venn_types::Agreement;

/// Denial reason when the daily sentiment vote quota is exhausted.
///
/// The exact string is part of the client contract; renderers match on it.
pub const DAILY_LIMIT_REASON: &str = "Daily limit reached for sentiment_votes/day";

/// Denial reason when policy requires a constituency proof and none was given.
pub const MISSING_PROOF_REASON: &str = "Missing constituency proof";

/// Upper bound for any admitted vote weight.
pub const MAX_VOTE_WEIGHT: f64 = 2.0;

/// The pseudonymous identity a replica votes as.
///
/// `scaled_trust_score` is the pre-computed weighting input; the raw
/// `trust_score` is carried for display only and never enters aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentitySession {
    pub nullifier: String,
    pub trust_score: f64,
    pub scaled_trust_score: f64,
}

/// What to do with a vote that carries no constituency proof.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProofPolicy {
    /// Admit the vote but force its weight down to `unweighted_weight`.
    AdmitUnweighted { unweighted_weight: f64 },
    /// Deny with [`MISSING_PROOF_REASON`].
    Require,
}

impl Default for ProofPolicy {
    fn default() -> Self {
        Self::AdmitUnweighted {
            unweighted_weight: 0.0,
        }
    }
}

/// Admission configuration for one replica.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdmissionConfig {
    pub proof_policy: ProofPolicy,
}

/// The toggle law: clicking your current stance retracts it.
///
/// Re-expressing the stance you already hold resolves to `Neutral`; anything
/// else resolves to the desired stance. Retraction is a write, not a delete.
pub fn effective_agreement(desired: Agreement, current: Agreement) -> Agreement {
    if desired == current {
        Agreement::Neutral
    } else {
        desired
    }
}

/// Clamp a raw trust-derived weight into the admissible `[0, 2]` range.
/// Non-finite inputs clamp to zero.
pub fn clamp_weight(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_VOTE_WEIGHT)
}
