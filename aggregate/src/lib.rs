//! Pure aggregation over voter contributions.
//!
//! Everything in this crate is a deterministic function of its inputs: no
//! clocks, no transport, no interior state. Replaying the same intent set
//! against the same previous snapshot always yields identical counts, which
//! is what makes snapshots safe to recompute anywhere in the mesh.

pub mod snapshot;
pub mod tally;

pub use snapshot::{compare_intent_lww, materialize_point_snapshot, MaterializeArgs, PointTuple};
pub use tally::{summarize_nodes, tally_winners, PointAggregate};
