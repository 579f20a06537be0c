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

//! A string-keyed store of arbitrary values, scoped to one view instance.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Per-view key-value data.
///
/// Values are stored as `Box<dyn Any + Send + Sync>` and retrieved by their
/// concrete type via [`get`](ViewDataStore::get).
///
/// # Example
///
/// ```rust
/// use stagehand_core::view::ViewDataStore;
///
/// let mut store = ViewDataStore::new();
/// store.set("gold", 42u32);
///
/// assert_eq!(store.get::<u32>("gold"), Some(42));
/// ```
#[derive(Default)]
pub struct ViewDataStore {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ViewDataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Inserts a value, replacing any previous value under `key`.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value under `key`.
    ///
    /// A missing key or a value of another type is logged and yields `None`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        let Some(value) = self.values.get(key) else {
            log::error!("View data lookup failed: key '{key}' does not exist");
            return None;
        };
        match value.downcast_ref::<T>() {
            Some(value) => Some(value.clone()),
            None => {
                log::error!(
                    "View data lookup failed: key '{key}' does not hold a {}",
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes the value under `key`. A missing key is logged.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.values.remove(key).is_none() {
            log::error!("View data removal failed: key '{key}' does not exist");
            return false;
        }
        true
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ViewDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("ViewDataStore").field("keys", &keys).finish()
    }
}
