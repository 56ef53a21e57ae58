//! Lamport clock: a monotonic logical counter.

/// A per-replica logical clock.
///
/// Local events `tick`; observing a remote timestamp `merge`s, so every
/// subsequent local write is causally after anything already seen. The
/// counter is monotonic for the lifetime of the process and never touches
/// wall-clock time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LamportClock {
    counter: u64,
}

impl LamportClock {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn with_value(counter: u64) -> Self {
        Self { counter }
    }

    /// Read the current counter without advancing it.
    pub fn value(&self) -> u64 {
        self.counter
    }

    /// Advance for a local event and return the new counter.
    pub fn tick(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Observe a remote counter: jump to `max(local, remote) + 1`.
    pub fn merge(&mut self, remote: u64) -> u64 {
        self.counter = self.counter.max(remote) + 1;
        self.counter
    }
}
