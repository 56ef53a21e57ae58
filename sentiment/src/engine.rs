//! The admission engine: the single write path for local votes.

use tracing::debug;
use venn_derive::{derive_proof_ref, derive_sentiment_event_id, derive_vote_intent_id};
use venn_messages::{AggregateVoterNode, ConstituencyProof, VoteAdmissionReceipt, VoteIntentRecord};
use venn_types::{Agreement, BudgetActionKey, Epoch, NullifierBudget, PointId, SynthesisId, Timestamp, TopicId, VoterId};

use crate::admission::{
    clamp_weight, effective_agreement, AdmissionConfig, IdentitySession, ProofPolicy,
    DAILY_LIMIT_REASON, MISSING_PROOF_REASON,
};
use crate::error::SentimentError;
use crate::queue::IntentQueue;
use crate::store::{ContributionKey, ContributionStore};

/// One vote click, as it arrives from the client surface.
#[derive(Clone, Debug)]
pub struct VoteRequest {
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub point_id: PointId,
    pub desired: Agreement,
    pub proof: Option<ConstituencyProof>,
}

/// Local vote state machine for one identity session.
///
/// `admit_vote` runs the full admission pipeline: toggle law, budget gate,
/// proof policy, intent derivation, queueing, and the register write. Denials
/// come back as receipts, never as errors; the `Err` arm is reserved for
/// internal invariant breaks.
pub struct SentimentEngine {
    session: IdentitySession,
    config: AdmissionConfig,
    budget: NullifierBudget,
    store: ContributionStore,
    queue: IntentQueue,
}

impl SentimentEngine {
    /// A fresh engine with a Season-0 budget dated `now`.
    pub fn new(
        session: IdentitySession,
        config: AdmissionConfig,
        queue: IntentQueue,
        now: Timestamp,
    ) -> Self {
        let budget = NullifierBudget::season_0(session.nullifier.clone(), now.utc_day());
        Self {
            session,
            config,
            budget,
            store: ContributionStore::new(),
            queue,
        }
    }

    /// The topic-scoped pseudonym this engine votes as.
    pub fn voter_id(&self, topic_id: &TopicId) -> VoterId {
        venn_derive::derive_aggregate_voter_id(&self.session.nullifier, topic_id)
    }

    pub fn admit_vote(
        &mut self,
        request: VoteRequest,
        now: Timestamp,
    ) -> Result<VoteAdmissionReceipt, SentimentError> {
        let voter_id = self.voter_id(&request.topic_id);
        let receipt_id = derive_sentiment_event_id(
            &self.session.nullifier,
            &request.topic_id,
            &request.synthesis_id,
            request.epoch,
            &request.point_id,
        );
        let deny = |reason: &str| VoteAdmissionReceipt {
            receipt_id: receipt_id.clone(),
            accepted: false,
            reason: Some(reason.to_owned()),
            topic_id: request.topic_id.clone(),
            synthesis_id: request.synthesis_id.clone(),
            epoch: request.epoch,
            point_id: request.point_id.clone(),
            admitted_at: now.as_millis(),
        };

        let today = now.utc_day();
        if self
            .budget
            .remaining(BudgetActionKey::SentimentVotesPerDay, &today)
            == 0
        {
            debug!(topic_id = %request.topic_id, point_id = %request.point_id, "vote denied: budget exhausted");
            return Ok(deny(DAILY_LIMIT_REASON));
        }

        // Proofs with empty fields are treated as absent.
        let proof = request.proof.filter(|p| p.validate().is_ok());
        let (weight, proof_ref) = match (&proof, self.config.proof_policy) {
            (Some(proof), _) => (
                clamp_weight(self.session.scaled_trust_score),
                derive_proof_ref(&proof.district_hash, &proof.nullifier, &proof.merkle_root),
            ),
            (None, ProofPolicy::Require) => {
                debug!(topic_id = %request.topic_id, point_id = %request.point_id, "vote denied: no constituency proof");
                return Ok(deny(MISSING_PROOF_REASON));
            }
            // Unproven intents still carry a stable opaque ref so the record
            // shape stays uniform on the wire.
            (None, ProofPolicy::AdmitUnweighted { unweighted_weight }) => (
                clamp_weight(unweighted_weight),
                derive_proof_ref("", &self.session.nullifier, ""),
            ),
        };

        let key = ContributionKey {
            topic_id: request.topic_id.clone(),
            synthesis_id: request.synthesis_id.clone(),
            epoch: request.epoch,
            voter_id: voter_id.clone(),
            point_id: request.point_id.clone(),
        };
        let current = self
            .store
            .node(&key)
            .map(|n| n.agreement)
            .unwrap_or_default();
        let effective = effective_agreement(request.desired, current);

        let intent_id = derive_vote_intent_id(
            &voter_id,
            &request.topic_id,
            &request.synthesis_id,
            request.epoch,
            &request.point_id,
        );
        self.queue.enqueue(VoteIntentRecord {
            intent_id,
            voter_id,
            topic_id: request.topic_id.clone(),
            synthesis_id: request.synthesis_id.clone(),
            epoch: request.epoch,
            point_id: request.point_id.clone(),
            agreement: effective,
            weight,
            proof_ref,
            seq: now.as_millis(),
            emitted_at: now.as_millis(),
        });

        self.store.set(
            key,
            AggregateVoterNode {
                point_id: request.point_id.clone(),
                agreement: effective,
                weight,
                updated_at: now.to_rfc3339(),
            },
        );

        // Every admitted click charges the daily quota, retractions included.
        self.budget
            .charge(BudgetActionKey::SentimentVotesPerDay, &today)?;

        Ok(VoteAdmissionReceipt {
            receipt_id,
            accepted: true,
            reason: None,
            topic_id: request.topic_id,
            synthesis_id: request.synthesis_id,
            epoch: request.epoch,
            point_id: request.point_id,
            admitted_at: now.as_millis(),
        })
    }

    pub fn session(&self) -> &IdentitySession {
        &self.session
    }

    pub fn budget(&self) -> &NullifierBudget {
        &self.budget
    }

    pub fn budget_mut(&mut self) -> &mut NullifierBudget {
        &mut self.budget
    }

    pub fn store(&self) -> &ContributionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContributionStore {
        &mut self.store
    }

    pub fn queue(&self) -> &IntentQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut IntentQueue {
        &mut self.queue
    }
}
