// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A keyed cache that collapses concurrent loads of the same key.
//!
//! Each key owns a slot holding a [`tokio::sync::OnceCell`]. The first caller
//! for a key runs the load; callers arriving while it is in flight wait on the
//! same cell and receive a clone of the same settled result. A successful
//! result stays cached until it is removed. A failed result is handed to every
//! waiter and then evicted, so the next call starts from scratch. A pending
//! slot whose last caller goes away before it settles is evicted as well.

use stagehand_core::LoadError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

type Slot<T> = Arc<OnceCell<Result<T, LoadError>>>;

/// The state of one key of a [`DedupCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// No slot, or a failed slot that is being evicted.
    Absent,
    /// A load is in flight.
    Pending,
    /// A successful result is cached.
    Ready,
}

/// A cache of settled results keyed by string, with at most one load in
/// flight per key.
pub struct DedupCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> Default for DedupCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> DedupCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or runs `init` to produce it.
    ///
    /// `init` runs only if no other caller is already loading `key`; otherwise
    /// this call waits for that load and shares its result.
    pub async fn load<F, Fut>(&self, key: &str, init: F) -> Result<T, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
    {
        let pending = PendingSlot {
            cache: self,
            key,
            slot: self.slot(key),
        };
        let result = pending.slot.get_or_init(init).await.clone();
        if result.is_err() {
            self.evict(key, &pending.slot);
        }
        result
    }

    /// The state of `key`.
    pub fn state(&self, key: &str) -> SlotState {
        match self.lock().get(key).map(|slot| slot.get()) {
            None | Some(Some(Err(_))) => SlotState::Absent,
            Some(None) => SlotState::Pending,
            Some(Some(Ok(_))) => SlotState::Ready,
        }
    }

    /// Returns a clone of the cached value, if `key` is ready.
    pub fn get(&self, key: &str) -> Option<T> {
        match self.lock().get(key)?.get() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Removes `key`, pending or not, and returns its cached value if it had
    /// one. Callers already waiting on a pending load still receive its result.
    pub fn remove(&self, key: &str) -> Option<T> {
        let slot = self.lock().remove(key)?;
        match slot.get() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Removes `key` only if it is ready and `predicate` accepts its value.
    pub fn remove_if(&self, key: &str, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut slots = self.lock();
        let value = match slots.get(key).and_then(|slot| slot.get()) {
            Some(Ok(value)) => value.clone(),
            _ => return None,
        };
        if !predicate(&value) {
            return None;
        }
        slots.remove(key);
        Some(value)
    }

    /// The keys with a cached value, sorted.
    pub fn ready_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot.get(), Some(Ok(_))))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Clones of every cached value, ordered by key.
    pub fn ready_values(&self) -> Vec<T> {
        let slots = self.lock();
        let mut entries: Vec<(&String, &T)> = slots
            .iter()
            .filter_map(|(key, slot)| match slot.get() {
                Some(Ok(value)) => Some((key, value)),
                _ => None,
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, value)| value.clone()).collect()
    }

    /// Drops every slot.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// The number of keys with a cached value.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| matches!(slot.get(), Some(Ok(_))))
            .count()
    }

    /// Returns `true` if no key has a cached value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Slot<T> {
        self.lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn evict(&self, key: &str, slot: &Slot<T>) {
        let mut slots = self.lock();
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
            log::trace!("Evicted failed slot '{key}'");
        }
    }

    /// Drops a slot that never settled once nobody is waiting on it.
    fn evict_abandoned(&self, key: &str, slot: &Slot<T>) {
        if slot.initialized() {
            return;
        }
        let mut slots = self.lock();
        // The map and the departing caller hold the only references.
        if Arc::strong_count(slot) == 2 && slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
            log::trace!("Evicted abandoned slot '{key}'");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One caller's hold on a slot for the duration of [`DedupCache::load`].
struct PendingSlot<'a, T: Clone> {
    cache: &'a DedupCache<T>,
    key: &'a str,
    slot: Slot<T>,
}

impl<T: Clone> Drop for PendingSlot<'_, T> {
    fn drop(&mut self) {
        self.cache.evict_abandoned(self.key, &self.slot);
    }
}
