//! Strict wire payload schemas.
//!
//! Everything that crosses the replicated mesh hydrates through these types.
//! Hydration is strict: unknown fields reject (never silently strip), value
//! ranges are enforced, and public aggregate payloads additionally pass a
//! recursive forbidden-key walk so identity material can never leak through
//! the privacy boundary. Enforcement lives in the schema, not convention.

pub mod error;
pub mod guard;
pub mod sentiment;

pub use error::SchemaError;
pub use guard::find_forbidden_field;
pub use sentiment::{
    AggregateVoterNode, ConstituencyProof, PointAggregateSnapshotV1, SentimentEvent, SourceWindow,
    VoteAdmissionReceipt, VoteIntentRecord, POINT_AGGREGATE_SNAPSHOT_VERSION,
};
