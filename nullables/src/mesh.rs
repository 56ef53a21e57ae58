//! An in-memory mesh with controllable ack behavior.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use venn_mesh::{MeshError, MeshTransport, Subscription};

/// How `put` acknowledges writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AckMode {
    /// Store, notify subscribers, ack immediately.
    #[default]
    Immediate,
    /// Store and notify, but never ack: the caller's timeout fires. This is
    /// the "write landed but the ack got lost" case.
    Silent,
    /// Reject the write with a transport error.
    Fail,
}

type SharedCallback = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Default)]
struct State {
    values: BTreeMap<String, Value>,
    ack_mode: AckMode,
    subscribers: HashMap<u64, (String, SharedCallback)>,
    next_subscriber: u64,
}

/// A deterministic single-process mesh. Clones share state, so several
/// replicas can be pointed at the same `NullMesh` to simulate a converged
/// network with zero propagation delay.
#[derive(Clone, Default)]
pub struct NullMesh {
    state: Arc<Mutex<State>>,
}

impl NullMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ack_mode(&self, mode: AckMode) {
        self.lock().ack_mode = mode;
    }

    /// Store a raw value directly, bypassing put semantics. For arranging
    /// pre-existing (possibly malformed) remote state in tests.
    pub fn seed(&self, path: &str, value: Value) {
        self.store(path, value);
    }

    /// The raw value at an exact path, if any.
    pub fn stored(&self, path: &str) -> Option<Value> {
        self.lock().values.get(path).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, path: &str, value: Value) {
        let notify: Vec<SharedCallback> = {
            let mut state = self.lock();
            state.values.insert(path.to_owned(), value.clone());
            state
                .subscribers
                .values()
                .filter(|(sub_path, _)| sub_path == path)
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };
        for callback in notify {
            callback(value.clone());
        }
    }

    /// Assemble the subtree under `path` into nested JSON objects.
    fn subtree(&self, path: &str) -> Option<Value> {
        let prefix = format!("{path}/");
        let state = self.lock();
        let mut root = Map::new();
        for (key, value) in state.values.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            insert_nested(&mut root, rest, value.clone());
        }
        if root.is_empty() {
            None
        } else {
            Some(Value::Object(root))
        }
    }
}

fn insert_nested(map: &mut Map<String, Value>, rest: &str, value: Value) {
    match rest.split_once('/') {
        None => {
            map.insert(rest.to_owned(), value);
        }
        Some((head, tail)) => {
            let slot = map
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = slot {
                insert_nested(nested, tail, value);
            }
        }
    }
}

#[async_trait]
impl MeshTransport for NullMesh {
    async fn put(&self, path: &str, value: Value) -> Result<(), MeshError> {
        let mode = self.lock().ack_mode;
        match mode {
            AckMode::Fail => Err(MeshError::Transport("null mesh configured to fail".into())),
            AckMode::Immediate => {
                self.store(path, value);
                Ok(())
            }
            AckMode::Silent => {
                self.store(path, value);
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }

    async fn once(&self, path: &str) -> Result<Option<Value>, MeshError> {
        if let Some(value) = self.stored(path) {
            return Ok(Some(value));
        }
        Ok(self.subtree(path))
    }

    async fn children(&self, path: &str) -> Result<BTreeMap<String, Value>, MeshError> {
        match self.subtree(path) {
            Some(Value::Object(map)) => Ok(map.into_iter().collect()),
            _ => Ok(BTreeMap::new()),
        }
    }

    fn subscribe(&self, path: &str, callback: venn_mesh::client::SubscribeCallback) -> Subscription {
        let id = {
            let mut state = self.lock();
            let id = state.next_subscriber;
            state.next_subscriber += 1;
            state
                .subscribers
                .insert(id, (path.to_owned(), Arc::from(callback)));
            id
        };
        let state = Arc::clone(&self.state);
        Subscription::new(move || {
            if let Ok(mut state) = state.lock() {
                state.subscribers.remove(&id);
            }
        })
    }
}
