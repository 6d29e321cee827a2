//! Topic → callback-set registry backing the realtime channel.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::realtime::topic::Topic;

/// Callback invoked with the payload of each matching event.
pub type Callback = Arc<dyn Fn(Value) + Send + Sync>;

/// Identifies one registered callback, returned by the `subscribe_*` methods.
///
/// Passing the handle back to the matching `unsubscribe_*` method removes
/// only that callback; passing `None` clears the whole topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub(crate) id: Uuid,
    topic: String,
}

impl SubscriptionHandle {
    /// Canonical key of the topic the callback is registered under.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// In-memory map of topics to their registered callbacks.
///
/// Set semantics per topic: each handle is invoked at most once per event.
/// An entry exists exactly while it has callbacks; the registry doubles as
/// the pending-subscription queue replayed on (re)connect.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

struct Entry {
    topic: Topic,
    callbacks: HashMap<Uuid, Callback>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds a callback under the topic's key, creating the entry when absent.
    /// The flag is true when this was the first callback for the topic — the
    /// signal to send a wire subscribe.
    pub fn register(&mut self, topic: Topic, callback: Callback) -> (SubscriptionHandle, bool) {
        let key = topic.key().to_string();
        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry {
            topic,
            callbacks: HashMap::new(),
        });
        let first = entry.callbacks.is_empty();
        let id = Uuid::new_v4();
        entry.callbacks.insert(id, callback);
        (SubscriptionHandle { id, topic: key }, first)
    }

    /// Removes one callback (or all, when `handle_id` is `None`) from the
    /// topic's entry. Returns the entry's topic when the entry became empty
    /// and was dropped — the signal to send a wire unsubscribe.
    pub fn unregister(&mut self, key: &str, handle_id: Option<Uuid>) -> Option<Topic> {
        let entry = self.entries.get_mut(key)?;
        match handle_id {
            Some(id) => {
                entry.callbacks.remove(&id);
            }
            None => entry.callbacks.clear(),
        }
        if entry.callbacks.is_empty() {
            self.entries.remove(key).map(|entry| entry.topic)
        } else {
            None
        }
    }

    /// Snapshot of the callbacks registered under a key.
    pub fn callbacks_for(&self, key: &str) -> Vec<Callback> {
        self.entries
            .get(key)
            .map(|entry| entry.callbacks.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of every registered topic, for replay on (re)connect.
    pub fn topics(&self) -> Vec<Topic> {
        self.entries
            .values()
            .map(|entry| entry.topic.clone())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
