//! The replica runtime.
//!
//! A `Replica` ties the pieces together: votes are admitted locally through
//! `venn-sentiment`, projected onto the mesh by the materializer, and read
//! back through bounded, retrying aggregate reads. All cross-replica effects
//! flow through the `MeshTransport` seam; replicas never talk to each other
//! directly.

pub mod config;
pub mod materializer;
pub mod replica;

pub use config::ReplicaConfig;
pub use materializer::{project_intent, row_to_intent};
pub use replica::{Replica, ReplaySummary};
