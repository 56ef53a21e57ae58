//! Generic last-writer-wins register.

use crate::clock::LamportClock;
use serde::{Deserialize, Serialize};

/// A value paired with the logical timestamp it was written at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LwwEntry<T> {
    pub value: T,
    pub timestamp: u64,
}

/// A conflict-free single-value cell.
///
/// `merge` only swaps on a *strictly greater* incoming timestamp; exact ties
/// retain the local value. Either way the clock advances past the larger of
/// the two timestamps, so a subsequent local `set` is causally after
/// everything merged in. Merging is commutative, associative, and
/// idempotent, which is what makes convergence coordination-free.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LwwRegister<T> {
    entry: Option<LwwEntry<T>>,
}

impl<T> Default for LwwRegister<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T: Clone> LwwRegister<T> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Store a new local value stamped with the next clock tick.
    pub fn set(&mut self, clock: &mut LamportClock, value: T) -> &LwwEntry<T> {
        let timestamp = clock.tick();
        self.entry.insert(LwwEntry { value, timestamp })
    }

    /// Merge a replicated entry. Returns the surviving entry.
    pub fn merge(&mut self, clock: &mut LamportClock, incoming: LwwEntry<T>) -> &LwwEntry<T> {
        match &mut self.entry {
            slot @ None => {
                clock.merge(incoming.timestamp);
                slot.insert(incoming)
            }
            Some(local) => {
                let newest = local.timestamp.max(incoming.timestamp);
                clock.merge(newest);
                // Local wins ties.
                if incoming.timestamp > local.timestamp {
                    *local = incoming;
                }
                local
            }
        }
    }

    /// The current value, if any write has been seen.
    pub fn read(&self) -> Option<&T> {
        self.entry.as_ref().map(|e| &e.value)
    }

    /// The current entry (value plus timestamp), for replication exchange.
    pub fn entry(&self) -> Option<&LwwEntry<T>> {
        self.entry.as_ref()
    }
}
