//! One replica: owned local state plus a handle to the mesh.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use venn_aggregate::PointAggregate;
use venn_crdt::LwwEntry;
use venn_derive::derive_vote_intent_id;
use venn_mesh::{read_aggregates, read_voter_rows, MeshError, MeshTransport};
use venn_messages::{AggregateVoterNode, VoteAdmissionReceipt};
use venn_sentiment::{
    ContributionKey, IdentitySession, IntentQueue, SentimentEngine, VoteRequest,
};
use venn_types::{Epoch, PointId, SynthesisId, Timestamp, TopicId, VennError};
use venn_utils::retry_delay;

use crate::config::ReplicaConfig;
use crate::materializer::project_intent;

/// Outcome of one queue replay pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub replayed: usize,
    pub failed: usize,
}

/// A single participant in the vote mesh.
///
/// All mutation goes through explicit methods (`admit_and_project`,
/// `merge_remote`, `replay_intent_queue`); there is no background task and no
/// shared global state, so behavior under test is fully deterministic.
pub struct Replica {
    engine: SentimentEngine,
    mesh: Arc<dyn MeshTransport>,
    config: ReplicaConfig,
}

impl Replica {
    pub fn new(
        session: IdentitySession,
        mesh: Arc<dyn MeshTransport>,
        config: ReplicaConfig,
        queue: IntentQueue,
        now: Timestamp,
    ) -> Self {
        let engine = SentimentEngine::new(session, config.admission, queue, now);
        Self {
            engine,
            mesh,
            config,
        }
    }

    pub fn engine(&self) -> &SentimentEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SentimentEngine {
        &mut self.engine
    }

    /// Admit a vote locally, then push it to the mesh.
    ///
    /// A failed projection does not fail the vote: the intent stays queued
    /// and a later [`Replica::replay_intent_queue`] pass retries it.
    pub async fn admit_and_project(
        &mut self,
        request: VoteRequest,
        now: Timestamp,
    ) -> Result<VoteAdmissionReceipt, VennError> {
        let receipt = self.engine.admit_vote(request, now)?;
        if !receipt.accepted {
            return Ok(receipt);
        }

        let voter_id = self.engine.voter_id(&receipt.topic_id);
        let intent_id = derive_vote_intent_id(
            &voter_id,
            &receipt.topic_id,
            &receipt.synthesis_id,
            receipt.epoch,
            &receipt.point_id,
        );
        let queued = self
            .engine
            .queue()
            .pending(usize::MAX)
            .into_iter()
            .find(|intent| intent.intent_id == intent_id);
        if let Some(intent) = queued {
            match project_intent(self.mesh.as_ref(), &intent, now).await {
                Ok(()) => self.engine.queue_mut().mark_projected(&intent.intent_id),
                Err(err) => {
                    warn!(intent_id = %intent.intent_id, error = %err, "projection failed, intent stays queued");
                }
            }
        }
        Ok(receipt)
    }

    /// Retry queued intents, oldest first. Failures stay queued.
    pub async fn replay_intent_queue(&mut self, now: Timestamp) -> ReplaySummary {
        let pending = self.engine.queue().pending(self.config.replay_limit);
        let mut summary = ReplaySummary::default();
        for intent in pending {
            match project_intent(self.mesh.as_ref(), &intent, now).await {
                Ok(()) => {
                    self.engine.queue_mut().mark_projected(&intent.intent_id);
                    summary.replayed += 1;
                }
                Err(err) => {
                    debug!(intent_id = %intent.intent_id, error = %err, "replay attempt failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            replayed = summary.replayed,
            failed = summary.failed,
            remaining = self.engine.queue().len(),
            "intent queue replay complete"
        );
        summary
    }

    /// Merge a replicated voter entry into local state.
    pub fn merge_remote(&mut self, key: ContributionKey, entry: LwwEntry<AggregateVoterNode>) {
        self.engine.store_mut().merge_remote(key, entry);
    }

    /// Read the public counts for one point, retrying failed or still-empty
    /// reads on a doubling delay schedule.
    pub async fn read_point_aggregate(
        &self,
        topic_id: &TopicId,
        synthesis_id: &SynthesisId,
        epoch: Epoch,
        point_id: &PointId,
    ) -> Result<PointAggregate, MeshError> {
        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            let result =
                read_aggregates(self.mesh.as_ref(), topic_id, synthesis_id, epoch, point_id).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            let last_attempt = attempt >= self.config.read_retries;
            match result {
                Ok(counts) => {
                    let empty =
                        counts.participants == 0 && counts.agree == 0 && counts.disagree == 0;
                    if !empty || last_attempt {
                        debug!(topic_id = %topic_id, point_id = %point_id, attempt, latency_ms, "aggregate read complete");
                        return Ok(counts);
                    }
                    // Empty can mean "not replicated here yet"; give the mesh
                    // another chance before reporting zeros.
                    debug!(topic_id = %topic_id, point_id = %point_id, attempt, latency_ms, "aggregate empty, retrying");
                }
                Err(err) if last_attempt => return Err(err),
                Err(err) => {
                    warn!(topic_id = %topic_id, point_id = %point_id, attempt, latency_ms, error = %err, "aggregate read failed, retrying");
                }
            }
            tokio::time::sleep(retry_delay(attempt as usize)).await;
            attempt += 1;
        }
    }

    /// Bootstrap local registers from the mesh. Returns how many rows merged;
    /// on exhausted attempts the replica continues on its local cache alone.
    pub async fn hydrate(
        &mut self,
        topic_id: &TopicId,
        synthesis_id: &SynthesisId,
        epoch: Epoch,
    ) -> usize {
        for attempt in 0..self.config.hydrate_attempts {
            match read_voter_rows(self.mesh.as_ref(), topic_id, synthesis_id, epoch).await {
                Ok(rows) if !rows.is_empty() => {
                    let merged = rows.len();
                    for row in rows {
                        let key = ContributionKey {
                            topic_id: topic_id.clone(),
                            synthesis_id: synthesis_id.clone(),
                            epoch,
                            voter_id: row.voter_id,
                            point_id: row.node.point_id.clone(),
                        };
                        self.engine.store_mut().merge_remote(
                            key,
                            LwwEntry {
                                value: row.node,
                                timestamp: row.updated_at_ms,
                            },
                        );
                    }
                    info!(topic_id = %topic_id, merged, attempt, "hydrated from mesh");
                    return merged;
                }
                Ok(_) => {
                    debug!(topic_id = %topic_id, attempt, "no voter rows yet");
                }
                Err(err) => {
                    warn!(topic_id = %topic_id, attempt, error = %err, "hydration read failed");
                }
            }
            // No delay after the last attempt; degraded mode starts right away.
            if attempt + 1 < self.config.hydrate_attempts {
                tokio::time::sleep(retry_delay(attempt as usize)).await;
            }
        }
        warn!(topic_id = %topic_id, "hydration exhausted, continuing with local cache");
        0
    }
}
