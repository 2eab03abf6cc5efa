//! Registry - event key to ordered listener list
//!
//! Not synchronized itself; the dispatcher keeps it behind one mutex.
//! A key whose list becomes empty is removed, so "absent" and "empty"
//! are the same state.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::EventKey;

use crate::listener::{Listener, ListenerId};

#[derive(Debug, Default)]
pub(crate) struct Registry {
    events: HashMap<EventKey, Vec<Arc<Listener>>>,
    /// Key each live listener is registered under
    index: HashMap<ListenerId, EventKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; returns the key's new listener count
    pub fn push(&mut self, event: EventKey, listener: Arc<Listener>) -> usize {
        self.index.insert(listener.id(), event.clone());
        let list = self.events.entry(event).or_default();
        list.push(listener);
        list.len()
    }

    /// Stored key and a copy of its list in registration order
    pub fn snapshot(&self, event: &str) -> Option<(EventKey, Vec<Arc<Listener>>)> {
        self.events
            .get_key_value(event)
            .map(|(key, list)| (key.clone(), list.clone()))
    }

    /// Constant time; called once per delivered listener during emit
    pub fn contains(&self, event: &str, id: ListenerId) -> bool {
        self.index.get(&id).is_some_and(|key| key.as_str() == event)
    }

    /// Remove the listener with `id`; returns whether one was removed
    pub fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        if !self.contains(event, id) {
            return false;
        }
        self.index.remove(&id);

        let Some(list) = self.events.get_mut(event) else {
            return false;
        };
        list.retain(|l| l.id() != id);
        if list.is_empty() {
            self.events.remove(event);
        }
        true
    }

    /// Drop whole lists; returns how many listeners were dropped
    pub fn remove_keys<I, K>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut removed = 0;
        for event in events {
            if let Some(list) = self.events.remove(event.as_ref()) {
                for listener in &list {
                    self.index.remove(&listener.id());
                }
                removed += list.len();
            }
        }
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    pub fn keys(&self) -> Vec<EventKey> {
        self.events.keys().cloned().collect()
    }

    /// Total listeners across all keys
    pub fn len(&self) -> usize {
        self.index.len()
    }
}
