//! A manually-advanced wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use venn_types::Timestamp;

/// Shared, manually-driven source of "now" in epoch milliseconds.
///
/// Clones share the same underlying instant, so one test can hold the clock
/// while the replica under test reads it.
#[derive(Clone, Debug)]
pub struct NullClock {
    millis: Arc<AtomicU64>,
}

impl NullClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_millis)),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(Ordering::SeqCst))
    }

    pub fn advance_ms(&self, delta: u64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_ms(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        // 2026-02-07T00:00:00Z, an arbitrary fixed day.
        Self::new(1_770_422_400_000)
    }
}
