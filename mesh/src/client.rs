//! The transport seam.
//!
//! The mesh itself (peer discovery, gossip, persistence) is out of scope;
//! replicas talk to it through this object-safe trait. The in-memory nullable
//! in `venn-nullables` is the reference implementation for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::MeshError;

/// Callback invoked with every replicated update to a subscribed path.
pub type SubscribeCallback = Box<dyn Fn(Value) + Send + Sync>;

/// An eventually-consistent key/value mesh.
///
/// `put` resolves when the transport acknowledges the write; adapters bound
/// it with [`crate::adapters::PUT_ACK_TIMEOUT`]. Reads return what this peer
/// currently sees, which may be stale or absent.
#[async_trait]
pub trait MeshTransport: Send + Sync {
    async fn put(&self, path: &str, value: Value) -> Result<(), MeshError>;

    async fn once(&self, path: &str) -> Result<Option<Value>, MeshError>;

    /// The direct children of `path`, keyed by child segment.
    async fn children(&self, path: &str) -> Result<BTreeMap<String, Value>, MeshError>;

    fn subscribe(&self, path: &str, callback: SubscribeCallback) -> Subscription;
}

/// A live subscription; dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn dropping_a_subscription_cancels_it() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let sub = Subscription::new(move || flag.store(true, Ordering::SeqCst));
        assert!(!cancelled.load(Ordering::SeqCst));
        drop(sub);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn detached_subscriptions_drop_quietly() {
        drop(Subscription::detached());
    }
}
