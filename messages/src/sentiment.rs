//! Sentiment wire payloads.
//!
//! Replicated document shapes for vote state. Strictness contract: every
//! `from_value` constructor rejects unknown fields, enforces value ranges,
//! and (for the public aggregate shapes) refuses payloads carrying identity
//! material anywhere in their tree.

use crate::error::SchemaError;
use crate::guard::find_forbidden_field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use venn_types::{Agreement, Epoch, IntentId, PointId, SynthesisId, TopicId, VoterId};

/// Schema version literal carried by every point aggregate snapshot.
pub const POINT_AGGREGATE_SNAPSHOT_VERSION: &str = "point-aggregate-snapshot-v1";

/// Maximum admissible vote weight.
pub const MAX_WEIGHT: f64 = 2.0;

fn require_weight(weight: f64) -> Result<(), SchemaError> {
    if !weight.is_finite() || !(0.0..=MAX_WEIGHT).contains(&weight) {
        return Err(SchemaError::Invalid(format!(
            "weight must be within [0, {MAX_WEIGHT}], got {weight}"
        )));
    }
    Ok(())
}

fn require_non_empty(value: &str, name: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::Invalid(format!("{name} must be non-empty")));
    }
    Ok(())
}

/// Eligibility bundle: district membership without raw identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstituencyProof {
    pub district_hash: String,
    pub nullifier: String,
    pub merkle_root: String,
}

impl ConstituencyProof {
    pub fn validate(&self) -> Result<(), SchemaError> {
        require_non_empty(&self.district_hash, "district_hash")?;
        require_non_empty(&self.nullifier, "nullifier")?;
        require_non_empty(&self.merkle_root, "merkle_root")
    }
}

/// A raw sentiment signal as emitted by a voting client.
///
/// Carries proof material, so it is *not* a public aggregate shape and must
/// never be written under the aggregate paths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentimentEvent {
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub point_id: PointId,
    pub agreement: Agreement,
    pub weight: f64,
    pub constituency_proof: ConstituencyProof,
    pub emitted_at: u64,
}

impl SentimentEvent {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let event: Self = serde_json::from_value(value.clone())?;
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        require_non_empty(self.topic_id.as_str(), "topic_id")?;
        require_non_empty(self.synthesis_id.as_str(), "synthesis_id")?;
        require_non_empty(self.point_id.as_str(), "point_id")?;
        require_weight(self.weight)?;
        self.constituency_proof.validate()
    }
}

/// Public per-voter contribution node.
///
/// The externally visible projection of one voter's current register value.
/// Identity fields never enter this shape; the privacy guard enforces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateVoterNode {
    pub point_id: PointId,
    pub agreement: Agreement,
    pub weight: f64,
    /// RFC 3339 UTC instant of the last register write.
    pub updated_at: String,
}

impl AggregateVoterNode {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        if let Some(key) = find_forbidden_field(value) {
            return Err(SchemaError::ForbiddenField(key));
        }
        let node: Self = serde_json::from_value(value.clone())?;
        node.validate()?;
        Ok(node)
    }

    pub fn to_value(&self) -> Result<Value, SchemaError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        require_non_empty(self.point_id.as_str(), "point_id")?;
        require_non_empty(&self.updated_at, "updated_at")?;
        require_weight(self.weight)
    }
}

/// A voter's desired state for one point: the idempotent intent log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteIntentRecord {
    pub intent_id: IntentId,
    pub voter_id: VoterId,
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub point_id: PointId,
    pub agreement: Agreement,
    pub weight: f64,
    /// Opaque digest of the proof, never the proof itself.
    pub proof_ref: String,
    pub seq: u64,
    pub emitted_at: u64,
}

impl VoteIntentRecord {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let record: Self = serde_json::from_value(value.clone())?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        require_non_empty(self.intent_id.as_str(), "intent_id")?;
        require_non_empty(self.voter_id.as_str(), "voter_id")?;
        require_non_empty(self.topic_id.as_str(), "topic_id")?;
        require_non_empty(self.synthesis_id.as_str(), "synthesis_id")?;
        require_non_empty(self.point_id.as_str(), "point_id")?;
        require_non_empty(&self.proof_ref, "proof_ref")?;
        require_weight(self.weight)
    }
}

/// Local, ephemeral admission outcome. Never replicated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteAdmissionReceipt {
    pub receipt_id: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub point_id: PointId,
    pub admitted_at: u64,
}

/// Which contiguous range of intent sequence numbers a snapshot folded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceWindow {
    pub from_seq: u64,
    pub to_seq: u64,
}

/// Public per-point rollup, a pure function of the current voter-node set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointAggregateSnapshotV1 {
    pub schema_version: String,
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub point_id: PointId,
    pub agree: u64,
    pub disagree: u64,
    pub weight: f64,
    pub participants: u64,
    pub version: u64,
    pub computed_at: u64,
    pub source_window: SourceWindow,
}

impl PointAggregateSnapshotV1 {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        if let Some(key) = find_forbidden_field(value) {
            return Err(SchemaError::ForbiddenField(key));
        }
        let snapshot: Self = serde_json::from_value(value.clone())?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_value(&self) -> Result<Value, SchemaError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.schema_version != POINT_AGGREGATE_SNAPSHOT_VERSION {
            return Err(SchemaError::Invalid(format!(
                "unsupported snapshot schema version: {}",
                self.schema_version
            )));
        }
        require_non_empty(self.topic_id.as_str(), "topic_id")?;
        require_non_empty(self.synthesis_id.as_str(), "synthesis_id")?;
        require_non_empty(self.point_id.as_str(), "point_id")?;
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(SchemaError::Invalid(format!(
                "weight must be a non-negative finite number, got {}",
                self.weight
            )));
        }
        if self.source_window.from_seq > self.source_window.to_seq {
            return Err(SchemaError::Invalid(format!(
                "source_window is inverted: {} > {}",
                self.source_window.from_seq, self.source_window.to_seq
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn voter_node_value() -> Value {
        json!({
            "point_id": "p1",
            "agreement": 1,
            "weight": 0.9,
            "updated_at": "2026-02-07T00:00:00.000Z",
        })
    }

    fn snapshot_value() -> Value {
        json!({
            "schema_version": POINT_AGGREGATE_SNAPSHOT_VERSION,
            "topic_id": "t1",
            "synthesis_id": "s1",
            "epoch": 0,
            "point_id": "p1",
            "agree": 2,
            "disagree": 1,
            "weight": 1.8,
            "participants": 3,
            "version": 4,
            "computed_at": 1_770_422_400_000u64,
            "source_window": { "from_seq": 1, "to_seq": 4 },
        })
    }

    #[test]
    fn voter_node_hydrates() {
        let node = AggregateVoterNode::from_value(&voter_node_value()).unwrap();
        assert_eq!(node.agreement, Agreement::Agree);
        assert_eq!(node.weight, 0.9);
    }

    #[test]
    fn voter_node_rejects_unknown_fields() {
        let mut value = voter_node_value();
        value["surprise"] = json!(true);
        assert!(matches!(
            AggregateVoterNode::from_value(&value),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn voter_node_rejects_out_of_range_weight() {
        let mut value = voter_node_value();
        value["weight"] = json!(2.5);
        assert!(AggregateVoterNode::from_value(&value).is_err());
        value["weight"] = json!(-0.1);
        assert!(AggregateVoterNode::from_value(&value).is_err());
    }

    #[test]
    fn voter_node_rejects_identity_material() {
        let mut value = voter_node_value();
        value["nullifier"] = json!("n1");
        assert!(matches!(
            AggregateVoterNode::from_value(&value),
            Err(SchemaError::ForbiddenField(_))
        ));
    }

    #[test]
    fn snapshot_hydrates() {
        let snapshot = PointAggregateSnapshotV1::from_value(&snapshot_value()).unwrap();
        assert_eq!(snapshot.agree, 2);
        assert_eq!(snapshot.source_window.to_seq, 4);
    }

    #[test]
    fn snapshot_rejects_every_forbidden_field() {
        for key in [
            "nullifier",
            "proof_ref",
            "constituency_proof",
            "voter_id",
            "proof",
            "district_hash",
        ] {
            let mut value = snapshot_value();
            value[key] = json!("x");
            assert!(
                matches!(
                    PointAggregateSnapshotV1::from_value(&value),
                    Err(SchemaError::ForbiddenField(_))
                ),
                "snapshot should reject `{key}`"
            );
        }
    }

    #[test]
    fn snapshot_rejects_wrong_schema_version() {
        let mut value = snapshot_value();
        value["schema_version"] = json!("point-aggregate-snapshot-v2");
        assert!(PointAggregateSnapshotV1::from_value(&value).is_err());
    }

    #[test]
    fn snapshot_rejects_negative_counts() {
        let mut value = snapshot_value();
        value["agree"] = json!(-1);
        assert!(PointAggregateSnapshotV1::from_value(&value).is_err());
    }

    #[test]
    fn snapshot_rejects_inverted_window() {
        let mut value = snapshot_value();
        value["source_window"] = json!({ "from_seq": 9, "to_seq": 2 });
        assert!(PointAggregateSnapshotV1::from_value(&value).is_err());
    }

    #[test]
    fn sentiment_event_requires_complete_proof() {
        let value = json!({
            "topic_id": "t1",
            "synthesis_id": "s1",
            "epoch": 0,
            "point_id": "p1",
            "agreement": -1,
            "weight": 1.0,
            "constituency_proof": {
                "district_hash": "d1",
                "nullifier": "",
                "merkle_root": "m1",
            },
            "emitted_at": 1_770_422_400_000u64,
        });
        assert!(SentimentEvent::from_value(&value).is_err());
    }

    #[test]
    fn intent_record_round_trips() {
        let record = VoteIntentRecord {
            intent_id: IntentId::new("i1"),
            voter_id: VoterId::new("v1"),
            topic_id: TopicId::new("t1"),
            synthesis_id: SynthesisId::new("s1"),
            epoch: Epoch::ZERO,
            point_id: PointId::new("p1"),
            agreement: Agreement::Disagree,
            weight: 1.2,
            proof_ref: "ref".into(),
            seq: 7,
            emitted_at: 7,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(VoteIntentRecord::from_value(&value).unwrap(), record);
    }

    #[test]
    fn receipt_reason_is_omitted_when_absent() {
        let receipt = VoteAdmissionReceipt {
            receipt_id: "r1".into(),
            accepted: true,
            reason: None,
            topic_id: TopicId::new("t1"),
            synthesis_id: SynthesisId::new("s1"),
            epoch: Epoch::ZERO,
            point_id: PointId::new("p1"),
            admitted_at: 0,
        };
        let value = serde_json::to_value(&receipt).unwrap();
        assert!(value.get("reason").is_none());
    }
}
