//! Bounded adapters between typed sentiment state and the raw transport.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use venn_aggregate::{summarize_nodes, PointAggregate};
use venn_messages::{find_forbidden_field, AggregateVoterNode, PointAggregateSnapshotV1};
use venn_types::{Epoch, PointId, SynthesisId, Timestamp, TopicId, VoterId};

use crate::client::MeshTransport;
use crate::error::MeshError;
use crate::path::{point_snapshot_path, voter_node_path, voters_root_path};
use crate::Subscription;

/// How long a `put` may wait for a transport ack.
pub const PUT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Total latency budget for any mesh read.
pub const READ_BUDGET: Duration = Duration::from_secs(3);

/// One voter's contribution as read back from the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct VoterRow {
    pub voter_id: VoterId,
    pub node: AggregateVoterNode,
    /// `updated_at` parsed to epoch milliseconds; unparseable stamps read as 0
    /// so they lose every LWW comparison instead of erroring.
    pub updated_at_ms: u64,
}

fn guarded(value: Value) -> Result<Value, MeshError> {
    if let Some(key) = find_forbidden_field(&value) {
        return Err(MeshError::Rejected(format!("forbidden field `{key}`")));
    }
    Ok(value)
}

/// Publish one voter node.
///
/// An ack timeout propagates as an error here: the write may have landed, and
/// the materializer runs a read-back recovery before giving up on it.
pub async fn write_voter_node(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    voter: &VoterId,
    node: &AggregateVoterNode,
) -> Result<(), MeshError> {
    let path = voter_node_path(topic, synthesis, epoch, voter, &node.point_id)?;
    let value = node
        .to_value()
        .map_err(|err| MeshError::Rejected(err.to_string()))?;
    let value = guarded(value)?;
    match tokio::time::timeout(PUT_ACK_TIMEOUT, mesh.put(path.as_str(), value)).await {
        Ok(result) => result,
        Err(_) => Err(MeshError::AckTimeout(PUT_ACK_TIMEOUT)),
    }
}

/// Publish a materialized snapshot, best-effort.
///
/// Snapshots are derivable from the voter rows, so an unacknowledged write is
/// only worth a warning.
pub async fn write_point_snapshot(
    mesh: &dyn MeshTransport,
    snapshot: &PointAggregateSnapshotV1,
) -> Result<(), MeshError> {
    let path = point_snapshot_path(
        &snapshot.topic_id,
        &snapshot.synthesis_id,
        snapshot.epoch,
        &snapshot.point_id,
    )?;
    let value = snapshot
        .to_value()
        .map_err(|err| MeshError::Rejected(err.to_string()))?;
    let value = guarded(value)?;
    match tokio::time::timeout(PUT_ACK_TIMEOUT, mesh.put(path.as_str(), value)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(path = %path, point_id = %snapshot.point_id, "snapshot put unacknowledged, proceeding");
            Ok(())
        }
    }
}

/// Read every voter row in one `(topic, synthesis, epoch)` scope.
///
/// Malformed rows are skipped; a read past [`READ_BUDGET`] yields an empty
/// set rather than blocking the caller.
pub async fn read_voter_rows(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
) -> Result<Vec<VoterRow>, MeshError> {
    let path = voters_root_path(topic, synthesis, epoch)?;
    let children = match tokio::time::timeout(READ_BUDGET, mesh.children(path.as_str())).await {
        Ok(result) => result?,
        Err(_) => {
            let err = MeshError::ReadTimeout {
                path: path.as_str().to_owned(),
                budget: READ_BUDGET,
            };
            warn!(error = %err, "voter row read degraded to empty");
            return Ok(Vec::new());
        }
    };

    let mut rows = Vec::new();
    for (voter_key, voter_value) in children {
        let Value::Object(points) = voter_value else {
            debug!(path = %path, voter = %voter_key, "dropping non-object voter entry");
            continue;
        };
        for (point_key, node_value) in points {
            match AggregateVoterNode::from_value(&node_value) {
                Ok(node) => {
                    let updated_at_ms = Timestamp::parse_rfc3339(&node.updated_at)
                        .map(|t| t.as_millis())
                        .unwrap_or(0);
                    rows.push(VoterRow {
                        voter_id: VoterId::new(voter_key.clone()),
                        node,
                        updated_at_ms,
                    });
                }
                Err(err) => {
                    debug!(path = %path, voter = %voter_key, point = %point_key, error = %err, "dropping invalid voter node");
                }
            }
        }
    }
    Ok(rows)
}

/// Read back a single voter node. Absent, timed-out, and invalid all read as
/// `None`.
pub async fn read_voter_node(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    voter: &VoterId,
    point: &PointId,
) -> Result<Option<AggregateVoterNode>, MeshError> {
    let path = voter_node_path(topic, synthesis, epoch, voter, point)?;
    let value = match tokio::time::timeout(READ_BUDGET, mesh.once(path.as_str())).await {
        Ok(result) => result?,
        Err(_) => {
            let err = MeshError::ReadTimeout {
                path: path.as_str().to_owned(),
                budget: READ_BUDGET,
            };
            debug!(error = %err, "voter node read as absent");
            return Ok(None);
        }
    };
    Ok(value.and_then(|v| match AggregateVoterNode::from_value(&v) {
        Ok(node) => Some(node),
        Err(err) => {
            debug!(path = %path, error = %err, "dropping invalid voter node");
            None
        }
    }))
}

/// Read the materialized snapshot for one point, if a valid one is published.
pub async fn read_point_snapshot(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    point: &PointId,
) -> Result<Option<PointAggregateSnapshotV1>, MeshError> {
    let path = point_snapshot_path(topic, synthesis, epoch, point)?;
    let value = match tokio::time::timeout(READ_BUDGET, mesh.once(path.as_str())).await {
        Ok(result) => result?,
        Err(_) => {
            let err = MeshError::ReadTimeout {
                path: path.as_str().to_owned(),
                budget: READ_BUDGET,
            };
            debug!(error = %err, "snapshot read as absent");
            return Ok(None);
        }
    };
    Ok(value.and_then(|v| match PointAggregateSnapshotV1::from_value(&v) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            debug!(path = %path, error = %err, "dropping invalid snapshot payload");
            None
        }
    }))
}

/// The public counts for one point: the materialized snapshot when present,
/// otherwise a live summary of the voter rows.
pub async fn read_aggregates(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    point: &PointId,
) -> Result<PointAggregate, MeshError> {
    if let Some(snapshot) = read_point_snapshot(mesh, topic, synthesis, epoch, point).await? {
        return Ok(PointAggregate {
            agree: snapshot.agree,
            disagree: snapshot.disagree,
            weight: snapshot.weight,
            participants: snapshot.participants,
        });
    }
    let rows = read_voter_rows(mesh, topic, synthesis, epoch).await?;
    Ok(summarize_nodes(
        rows.iter()
            .filter(|row| row.node.point_id == *point)
            .map(|row| &row.node),
    ))
}

/// Subscribe to snapshot updates for one point. Invalid payloads are dropped
/// before the callback sees them.
pub fn watch_point_snapshot(
    mesh: &dyn MeshTransport,
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    point: &PointId,
    on_snapshot: impl Fn(PointAggregateSnapshotV1) + Send + Sync + 'static,
) -> Result<Subscription, MeshError> {
    let path = point_snapshot_path(topic, synthesis, epoch, point)?;
    Ok(mesh.subscribe(
        path.as_str(),
        Box::new(move |value| match PointAggregateSnapshotV1::from_value(&value) {
            Ok(snapshot) => on_snapshot(snapshot),
            Err(err) => debug!(error = %err, "dropping invalid snapshot update"),
        }),
    ))
}
