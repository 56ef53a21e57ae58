//! In-process test doubles.
//!
//! These are real implementations of the production seams (transport, clock,
//! queue storage) with deterministic, inspectable behavior, so higher layers
//! can be exercised without network, disk, or wall clocks.

pub mod clock;
pub mod mesh;
pub mod queue;

pub use clock::NullClock;
pub use mesh::{AckMode, NullMesh};
pub use queue::MemoryQueueStore;
