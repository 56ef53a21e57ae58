//! An in-memory queue store with failure injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use venn_messages::VoteIntentRecord;
use venn_sentiment::{QueueStore, StorageError};

/// A [`QueueStore`] that keeps records in memory and can be told to fail,
/// for exercising the queue's degraded mode.
#[derive(Clone, Default)]
pub struct MemoryQueueStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Mutex<Vec<VoteIntentRecord>>,
    fail: AtomicBool,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent load/persist fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.fail.store(failing, Ordering::SeqCst);
    }

    /// What the store currently holds.
    pub fn persisted(&self) -> Vec<VoteIntentRecord> {
        self.inner
            .records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.inner.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other(
                "memory queue store configured to fail",
            )));
        }
        Ok(())
    }
}

impl QueueStore for MemoryQueueStore {
    fn load(&self) -> Result<Vec<VoteIntentRecord>, StorageError> {
        self.check()?;
        Ok(self.persisted())
    }

    fn persist(&self, records: &[VoteIntentRecord]) -> Result<(), StorageError> {
        self.check()?;
        if let Ok(mut stored) = self.inner.records.lock() {
            *stored = records.to_vec();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venn_sentiment::IntentQueue;
    use venn_types::{Agreement, Epoch, IntentId, PointId, SynthesisId, TopicId, VoterId};

    fn record(intent: &str) -> VoteIntentRecord {
        VoteIntentRecord {
            intent_id: IntentId::new(intent),
            voter_id: VoterId::new("v1"),
            topic_id: TopicId::new("t1"),
            synthesis_id: SynthesisId::new("s1"),
            epoch: Epoch::ZERO,
            point_id: PointId::new("p1"),
            agreement: Agreement::Agree,
            weight: 1.0,
            proof_ref: "ref".into(),
            seq: 1,
            emitted_at: 1,
        }
    }

    #[test]
    fn persists_queue_mutations() {
        let store = MemoryQueueStore::new();
        let mut queue = IntentQueue::new(Box::new(store.clone()));
        queue.enqueue(record("i1"));
        assert_eq!(store.persisted().len(), 1);
        queue.mark_projected(&IntentId::new("i1"));
        assert!(store.persisted().is_empty());
    }

    #[test]
    fn injected_failure_degrades_the_queue() {
        let store = MemoryQueueStore::new();
        let mut queue = IntentQueue::new(Box::new(store.clone()));
        store.set_failing(true);
        queue.enqueue(record("i1"));
        assert!(queue.is_degraded());
        assert!(store.persisted().is_empty());
        // Recovery: next successful persist clears the degraded flag.
        store.set_failing(false);
        queue.enqueue(record("i2"));
        assert!(!queue.is_degraded());
        assert_eq!(store.persisted().len(), 2);
    }
}
