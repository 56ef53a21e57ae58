//! The aggregate path scheme.
//!
//! Layout (wire contract, shared by every replica):
//!
//! ```text
//! aggregates/topics/<topic>/syntheses/<synthesis>/epochs/<epoch>/voters/<voter>/<point>
//! aggregates/topics/<topic>/syntheses/<synthesis>/epochs/<epoch>/points/<point>
//! ```

use venn_types::{Epoch, PointId, SynthesisId, TopicId, VoterId};

use crate::error::MeshError;

const ROOT: &str = "aggregates/topics";

/// A validated, slash-joined mesh path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshPath(String);

impl MeshPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeshPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn segment(raw: &str) -> Result<&str, MeshError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(MeshError::InvalidPath(raw.to_owned()));
    }
    Ok(trimmed)
}

fn scope(topic: &TopicId, synthesis: &SynthesisId, epoch: Epoch) -> Result<String, MeshError> {
    Ok(format!(
        "{ROOT}/{}/syntheses/{}/epochs/{}",
        segment(topic.as_str())?,
        segment(synthesis.as_str())?,
        epoch.value(),
    ))
}

/// The voters map for one `(topic, synthesis, epoch)` scope.
pub fn voters_root_path(
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
) -> Result<MeshPath, MeshError> {
    Ok(MeshPath(format!("{}/voters", scope(topic, synthesis, epoch)?)))
}

/// One voter's node for one point.
pub fn voter_node_path(
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    voter: &VoterId,
    point: &PointId,
) -> Result<MeshPath, MeshError> {
    Ok(MeshPath(format!(
        "{}/voters/{}/{}",
        scope(topic, synthesis, epoch)?,
        segment(voter.as_str())?,
        segment(point.as_str())?,
    )))
}

/// The materialized snapshot slot for one point.
pub fn point_snapshot_path(
    topic: &TopicId,
    synthesis: &SynthesisId,
    epoch: Epoch,
    point: &PointId,
) -> Result<MeshPath, MeshError> {
    Ok(MeshPath(format!(
        "{}/points/{}",
        scope(topic, synthesis, epoch)?,
        segment(point.as_str())?,
    )))
}
