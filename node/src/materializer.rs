//! Projects queued vote intents onto the mesh.
//!
//! For each intent: compare against the currently materialized row for that
//! voter, write the voter node if the intent is newer, then recompute and
//! publish the point snapshot. A lost put ack is recovered by reading the
//! node back; an intent that cannot be confirmed stays queued for replay.

use tracing::{debug, warn};
use venn_aggregate::{compare_intent_lww, materialize_point_snapshot, MaterializeArgs, PointTuple};
use venn_mesh::{
    read_point_snapshot, read_voter_node, read_voter_rows, write_point_snapshot, write_voter_node,
    MeshError, MeshTransport, VoterRow,
};
use venn_messages::{AggregateVoterNode, VoteIntentRecord};
use venn_types::{Epoch, IntentId, SynthesisId, Timestamp, TopicId};

/// Reconstruct a comparable intent from a row already on the mesh.
///
/// Materialized rows carry no intent id, so they get a synthetic one; LWW
/// comparison is driven by `seq`/`emitted_at` (the row's `updated_at`), with
/// the id only breaking exact ties.
pub fn row_to_intent(
    topic_id: &TopicId,
    synthesis_id: &SynthesisId,
    epoch: Epoch,
    row: &VoterRow,
) -> VoteIntentRecord {
    VoteIntentRecord {
        intent_id: IntentId::new(format!(
            "materialized:{}:{}",
            row.voter_id, row.node.point_id
        )),
        voter_id: row.voter_id.clone(),
        topic_id: topic_id.clone(),
        synthesis_id: synthesis_id.clone(),
        epoch,
        point_id: row.node.point_id.clone(),
        agreement: row.node.agreement,
        weight: row.node.weight,
        proof_ref: "materialized".into(),
        seq: row.updated_at_ms,
        emitted_at: row.updated_at_ms,
    }
}

fn confirms_intent(node: &AggregateVoterNode, intent: &VoteIntentRecord) -> bool {
    let updated_at_ms = Timestamp::parse_rfc3339(&node.updated_at)
        .map(|t| t.as_millis())
        .unwrap_or(0);
    node.point_id == intent.point_id
        && node.agreement == intent.agreement
        && updated_at_ms >= intent.seq
}

/// Apply one intent to the mesh and republish the point snapshot.
///
/// Succeeds (and the caller may dequeue) when either the write was acked, the
/// ack was lost but a read-back confirms the node, or the mesh already holds
/// a newer row for this voter. Snapshot publication is best-effort on top.
pub async fn project_intent(
    mesh: &dyn MeshTransport,
    intent: &VoteIntentRecord,
    computed_at: Timestamp,
) -> Result<(), MeshError> {
    let rows = read_voter_rows(mesh, &intent.topic_id, &intent.synthesis_id, intent.epoch).await?;

    let existing = rows
        .iter()
        .find(|row| row.voter_id == intent.voter_id && row.node.point_id == intent.point_id);
    let superseded = existing
        .map(|row| {
            let current = row_to_intent(&intent.topic_id, &intent.synthesis_id, intent.epoch, row);
            !compare_intent_lww(intent, &current)
        })
        .unwrap_or(false);

    if superseded {
        debug!(intent_id = %intent.intent_id, voter_id = %intent.voter_id, "intent superseded by newer materialized row");
    } else {
        let node = AggregateVoterNode {
            point_id: intent.point_id.clone(),
            agreement: intent.agreement,
            weight: intent.weight,
            updated_at: Timestamp::new(intent.emitted_at).to_rfc3339(),
        };
        let write = write_voter_node(
            mesh,
            &intent.topic_id,
            &intent.synthesis_id,
            intent.epoch,
            &intent.voter_id,
            &node,
        )
        .await;
        match write {
            Ok(()) => {}
            Err(MeshError::AckTimeout(timeout)) => {
                // The write may have propagated without an ack; read it back.
                let recovered = read_voter_node(
                    mesh,
                    &intent.topic_id,
                    &intent.synthesis_id,
                    intent.epoch,
                    &intent.voter_id,
                    &intent.point_id,
                )
                .await?;
                match recovered {
                    Some(read_back) if confirms_intent(&read_back, intent) => {
                        warn!(intent_id = %intent.intent_id, "put ack lost, write confirmed by read-back");
                    }
                    _ => return Err(MeshError::AckTimeout(timeout)),
                }
            }
            Err(err) => return Err(err),
        }
    }

    republish_snapshot(mesh, intent, computed_at).await
}

async fn republish_snapshot(
    mesh: &dyn MeshTransport,
    intent: &VoteIntentRecord,
    computed_at: Timestamp,
) -> Result<(), MeshError> {
    let tuple = PointTuple {
        topic_id: intent.topic_id.clone(),
        synthesis_id: intent.synthesis_id.clone(),
        epoch: intent.epoch,
        point_id: intent.point_id.clone(),
    };

    let rows = read_voter_rows(mesh, &intent.topic_id, &intent.synthesis_id, intent.epoch).await?;
    let mut intents: Vec<VoteIntentRecord> = rows
        .iter()
        .filter(|row| row.node.point_id == intent.point_id)
        .map(|row| row_to_intent(&intent.topic_id, &intent.synthesis_id, intent.epoch, row))
        .collect();
    // Cover the window where this replica's own write is not yet readable.
    intents.push(intent.clone());

    let previous =
        read_point_snapshot(mesh, &intent.topic_id, &intent.synthesis_id, intent.epoch, &intent.point_id)
            .await?;
    let snapshot = materialize_point_snapshot(MaterializeArgs {
        tuple: &tuple,
        intents: &intents,
        previous: previous.as_ref(),
        computed_at,
    });
    write_point_snapshot(mesh, &snapshot).await
}
