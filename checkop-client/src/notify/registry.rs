//! Subscription registry for job-status fan-out
//!
//! Maps a subscription key (one job id, or the wildcard) to an ordered set
//! of callbacks. Multiple subscriptions per key are independent and
//! additive. Dispatch iterates over a snapshot of the subscriber set and
//! re-checks registry membership before each invocation, so a subscriber
//! unsubscribing itself (or a sibling) mid-dispatch neither corrupts
//! iteration nor receives a late delivery.

use checkop_common::events::FileStatusEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Callback invoked with every event matching a subscription's key.
pub type EventCallback = dyn Fn(&FileStatusEvent) + Send + Sync;

/// What a subscription listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Events for a single job id.
    File(String),
    /// Every job-status event.
    All,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: Mutex<HashMap<SubscriptionKey, HashMap<u64, Arc<EventCallback>>>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `key`, returning its registration id.
    pub fn add(&self, key: SubscriptionKey, callback: Arc<EventCallback>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        entries.entry(key).or_default().insert(id, callback);
        id
    }

    /// Remove one registration. The key entry is pruned once its last
    /// subscriber is gone; the transport is unaffected.
    pub fn remove(&self, key: &SubscriptionKey, id: u64) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        if let Some(set) = entries.get_mut(key) {
            set.remove(&id);
            if set.is_empty() {
                entries.remove(key);
            }
        }
    }

    /// Drop every registration (deliberate disconnect).
    pub fn clear(&self) {
        self.entries.lock().expect("registry lock poisoned").clear();
    }

    /// Whether a registration is still live. Checked at dispatch time so an
    /// unsubscribe is effective even against an in-flight delivery.
    fn contains(&self, key: &SubscriptionKey, id: u64) -> bool {
        self.entries
            .lock()
            .expect("registry lock poisoned")
            .get(key)
            .is_some_and(|set| set.contains_key(&id))
    }

    /// Number of live registrations across all keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("registry lock poisoned")
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to subscribers of its job id, then to wildcard
    /// subscribers. Callbacks run without the registry lock held.
    pub fn dispatch(&self, event: &FileStatusEvent) {
        let keys = [
            SubscriptionKey::File(event.file_id.clone()),
            SubscriptionKey::All,
        ];
        for key in keys {
            let snapshot: Vec<(u64, Arc<EventCallback>)> = {
                let entries = self.entries.lock().expect("registry lock poisoned");
                match entries.get(&key) {
                    Some(set) => {
                        let mut subs: Vec<_> =
                            set.iter().map(|(id, cb)| (*id, Arc::clone(cb))).collect();
                        // Registration order, so delivery within a key is stable
                        subs.sort_by_key(|(id, _)| *id);
                        subs
                    }
                    None => continue,
                }
            };
            for (id, callback) in snapshot {
                if self.contains(&key, id) {
                    callback(event);
                }
            }
        }
    }
}

/// RAII handle for one registration.
///
/// Dropping the handle (UI unmount) or calling [`Subscription::unsubscribe`]
/// removes the registration immediately and permanently: no callback
/// invocation happens afterwards, even for an event already in flight.
pub struct Subscription {
    registry: Arc<SubscriptionRegistry>,
    key: SubscriptionKey,
    id: u64,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(registry: Arc<SubscriptionRegistry>, key: SubscriptionKey, id: u64) -> Self {
        Self {
            registry,
            key,
            id,
            active: true,
        }
    }

    /// Remove this registration now.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.active {
            self.active = false;
            self.registry.remove(&self.key, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
