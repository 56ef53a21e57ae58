//! Bounded durable queue of vote intents awaiting projection.
//!
//! Intents survive restarts through a [`QueueStore`]; a broken store degrades
//! the queue to in-memory operation instead of blocking votes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use venn_messages::VoteIntentRecord;
use venn_types::IntentId;

use crate::error::StorageError;

/// Hard cap on queued intents; the oldest entry is evicted past this.
pub const MAX_QUEUE_SIZE: usize = 200;

/// Persistence backend for the intent queue.
pub trait QueueStore: Send {
    fn load(&self) -> Result<Vec<VoteIntentRecord>, StorageError>;
    fn persist(&self, records: &[VoteIntentRecord]) -> Result<(), StorageError>;
}

/// JSON-file backend. A missing file loads as an empty queue.
pub struct FileQueueStore {
    path: PathBuf,
}

impl FileQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueueStore for FileQueueStore {
    fn load(&self) -> Result<Vec<VoteIntentRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, records: &[VoteIntentRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(records)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Replay ordering: oldest sequence first, full tuple as tie-breaker so the
/// order is total and identical on every replica.
fn replay_key(record: &VoteIntentRecord) -> impl Ord + '_ {
    (
        record.seq,
        record.emitted_at,
        &record.topic_id,
        &record.synthesis_id,
        record.epoch,
        &record.point_id,
        &record.voter_id,
        &record.intent_id,
    )
}

/// The pending-intent queue of one replica.
///
/// Enqueueing is idempotent on `intent_id`: a re-vote on the same point
/// replaces the queued record (same id, newer agreement and seq) instead of
/// accumulating a second entry.
pub struct IntentQueue {
    entries: Vec<VoteIntentRecord>,
    store: Option<Box<dyn QueueStore>>,
    degraded: bool,
}

impl IntentQueue {
    /// A queue backed by `store`. If the initial load fails, start empty and
    /// stay in-memory for the rest of this process.
    pub fn new(store: Box<dyn QueueStore>) -> Self {
        match store.load() {
            Ok(mut entries) => {
                entries.truncate(MAX_QUEUE_SIZE);
                Self {
                    entries,
                    store: Some(store),
                    degraded: false,
                }
            }
            Err(err) => {
                warn!(error = %err, "intent queue load failed, continuing in-memory");
                Self {
                    entries: Vec::new(),
                    store: Some(store),
                    degraded: true,
                }
            }
        }
    }

    /// A purely in-memory queue.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            store: None,
            degraded: false,
        }
    }

    /// Add or replace a pending intent. Evicts the oldest entry past the cap.
    pub fn enqueue(&mut self, record: VoteIntentRecord) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.intent_id == record.intent_id)
        {
            *existing = record;
        } else {
            if self.entries.len() >= MAX_QUEUE_SIZE {
                let evicted = self.entries.remove(0);
                warn!(intent_id = %evicted.intent_id, "intent queue full, evicting oldest entry");
            }
            self.entries.push(record);
        }
        self.persist();
    }

    /// Up to `limit` pending intents in replay order.
    pub fn pending(&self, limit: usize) -> Vec<VoteIntentRecord> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| replay_key(a).cmp(&replay_key(b)));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// Remove an intent whose projection onto the mesh succeeded.
    /// Unknown ids are a no-op; failed projections simply stay queued.
    pub fn mark_projected(&mut self, intent_id: &IntentId) {
        let before = self.entries.len();
        self.entries.retain(|e| e.intent_id != *intent_id);
        if self.entries.len() != before {
            self.persist();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether queue persistence has failed and state is memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.persist(&self.entries) {
            if !self.degraded {
                warn!(error = %err, "intent queue persist failed, continuing in-memory");
            }
            self.degraded = true;
        } else {
            self.degraded = false;
        }
    }
}
