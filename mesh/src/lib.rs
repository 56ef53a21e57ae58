//! Replication layer: how local sentiment state reaches the mesh.
//!
//! The transport itself is abstract (`MeshTransport`); this crate owns the
//! path scheme, the bounded-latency adapters around puts and reads, and the
//! privacy guard applied to everything outbound. Writes are acknowledged
//! best-effort: an ack timeout is a degraded success, not a failure, except
//! for voter-node writes where the caller runs its own recovery.

pub mod adapters;
pub mod client;
pub mod error;
pub mod path;

pub use adapters::{
    read_aggregates, read_point_snapshot, read_voter_node, read_voter_rows, watch_point_snapshot,
    write_point_snapshot, write_voter_node, VoterRow, PUT_ACK_TIMEOUT, READ_BUDGET,
};
pub use client::{MeshTransport, Subscription};
pub use error::MeshError;
pub use path::{point_snapshot_path, voter_node_path, voters_root_path, MeshPath};
