//! Vote admission and local sentiment state.
//!
//! This crate owns the write path of a replica: the admission gate (budget +
//! constituency proof + toggle law), the per-voter LWW contribution registers,
//! and the bounded durable queue of vote intents awaiting projection onto the
//! mesh. Everything here is synchronous and transport-free; replication lives
//! in `venn-mesh` and `venn-node`.

pub mod admission;
pub mod engine;
pub mod error;
pub mod queue;
pub mod store;

pub use admission::{
    clamp_weight, effective_agreement, AdmissionConfig, IdentitySession, ProofPolicy,
    DAILY_LIMIT_REASON, MISSING_PROOF_REASON,
};
pub use engine::{SentimentEngine, VoteRequest};
pub use error::{SentimentError, StorageError};
pub use queue::{FileQueueStore, IntentQueue, QueueStore, MAX_QUEUE_SIZE};
pub use store::{ContributionKey, ContributionStore};
