//! Conflict-free replicated primitives.
//!
//! Two building blocks: a Lamport clock for causal ordering without
//! synchronized wall clocks, and a generic last-writer-wins register whose
//! merge is commutative, associative, and idempotent. Replicas converge by
//! re-exchanging entries and re-merging, with no coordination protocol.

pub mod clock;
pub mod lww;

pub use clock::LamportClock;
pub use lww::{LwwEntry, LwwRegister};
