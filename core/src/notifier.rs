//! Multicast notification to a dynamic set of weakly held observers.
//!
//! # Design
//! Observers are registered as `Arc<T>` and stored as `Weak<T>`, so the
//! registry never keeps an observer alive; once the owner drops its last
//! `Arc` the entry is pruned the next time `notify` runs. Because only
//! `Arc` handles can be registered, value types are ruled out at compile
//! time.
//!
//! Every `add` returns a `SubscriptionId` that removes exactly that entry.
//! `remove` is the identity-based alternative and removes the first entry
//! pointing at the same allocation. Nothing is deduplicated: adding one
//! observer twice yields two entries and two calls per notification.
//!
//! The registry sits behind a mutex because completions may arrive on
//! several runtime threads at once. `notify` snapshots the live entries,
//! then re-checks each one under the lock right before calling it, so an
//! entry removed mid-notification (by an earlier observer or another thread)
//! is skipped. The lock is never held while an observer runs, so callbacks
//! may add or remove subscriptions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

/// Token identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

struct Entry<T: ?Sized> {
    id: SubscriptionId,
    observer: Weak<T>,
}

pub struct Multicast<T: ?Sized> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<T>>>,
}

impl<T: ?Sized> Default for Multicast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Multicast<T> {
    pub fn new() -> Self {
        Self {
            // Ids start at 1 so 0 is free to mean "no subscription" across FFI.
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, observer: &Arc<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Entry {
            id,
            observer: Arc::downgrade(observer),
        });
        id
    }

    /// Remove the first entry registered for `observer`. Returns whether an
    /// entry was found.
    pub fn remove(&self, observer: &Arc<T>) -> bool {
        let target = Arc::downgrade(observer);
        let mut entries = self.lock();
        match entries.iter().position(|e| e.observer.ptr_eq(&target)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.lock();
        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Call `invocation` once per live observer, in registration order.
    /// Entries whose observer has been dropped are pruned.
    pub fn notify<F>(&self, mut invocation: F)
    where
        F: FnMut(&T),
    {
        let live: Vec<(SubscriptionId, Arc<T>)> = {
            let mut entries = self.lock();
            entries.retain(|e| e.observer.strong_count() > 0);
            entries
                .iter()
                .filter_map(|e| e.observer.upgrade().map(|o| (e.id, o)))
                .collect()
        };
        for (id, observer) in &live {
            if !self.contains(*id) {
                continue;
            }
            invocation(observer);
        }
    }

    /// Number of entries, including dropped observers not yet pruned.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.lock().iter().any(|e| e.id == id)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry<T>>> {
        self.entries.lock()
    }
}
