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

//! A keyed storage for loaded asset handles.

use stagehand_core::asset::AssetHandle;
use stagehand_core::ResourcePath;
use std::collections::HashMap;

/// A central, in-memory record of the assets this process asked the engine
/// to load.
///
/// This structure maps a full resource address to the shared `AssetHandle`.
/// Subsequent requests for the same address receive a clone of the cached
/// handle. The engine still owns the asset; removing an entry here does not
/// free anything by itself, it only reflects a release request.
///
/// Every removal bumps a release generation. A fetch records
/// [`generation`](AssetCache::generation) before it starts and stores its
/// result with [`insert_unless_released`](AssetCache::insert_unless_released),
/// so a handle released while it was still in flight never re-enters the
/// cache.
#[derive(Debug, Default, Clone)]
pub struct AssetCache {
    storage: HashMap<ResourcePath, AssetHandle>,
    generation: u64,
    released: HashMap<ResourcePath, u64>,
    released_packages: HashMap<String, u64>,
    cleared: u64,
}

impl AssetCache {
    /// Creates a new, empty asset cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a handle, replacing any previous handle for the address.
    pub fn insert(&mut self, path: ResourcePath, handle: AssetHandle) {
        self.storage.insert(path, handle);
    }

    /// The current release generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if `path`, its package, or the whole cache was released
    /// after `generation`.
    pub fn released_since(&self, path: &ResourcePath, generation: u64) -> bool {
        self.cleared > generation
            || self
                .released_packages
                .get(path.package())
                .is_some_and(|&at| at > generation)
            || self.released.get(path).is_some_and(|&at| at > generation)
    }

    /// Inserts a handle fetched since `generation`, unless its address was
    /// released in the meantime. Returns `false` if the handle was discarded.
    pub fn insert_unless_released(&mut self, path: ResourcePath, handle: AssetHandle, generation: u64) -> bool {
        if self.released_since(&path, generation) {
            return false;
        }
        self.insert(path, handle);
        true
    }

    /// Retrieves the handle for an address, if cached.
    pub fn get(&self, path: &ResourcePath) -> Option<&AssetHandle> {
        self.storage.get(path)
    }

    /// Checks whether an address is cached.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.storage.contains_key(path)
    }

    /// Removes one address.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<AssetHandle> {
        self.generation += 1;
        self.released.insert(path.clone(), self.generation);
        self.storage.remove(path)
    }

    /// Removes every address owned by `package` and returns how many were
    /// dropped.
    pub fn remove_package(&mut self, package: &str) -> usize {
        self.generation += 1;
        self.released_packages
            .insert(package.to_string(), self.generation);
        self.released.retain(|path, _| path.package() != package);

        let before = self.storage.len();
        self.storage.retain(|path, _| path.package() != package);
        before - self.storage.len()
    }

    /// The cached subpaths of `package`, sorted.
    pub fn keys_in(&self, package: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .storage
            .keys()
            .filter(|path| path.package() == package)
            .map(|path| path.subpath().to_string())
            .collect();
        keys.sort();
        keys
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.cleared = self.generation;
        self.released.clear();
        self.released_packages.clear();
        self.storage.clear();
    }

    /// The number of cached addresses.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::asset::Asset;

    struct Texture;
    impl Asset for Texture {}

    fn path(text: &str) -> ResourcePath {
        ResourcePath::parse(text).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = AssetCache::new();
        let handle = AssetHandle::new(Texture);
        cache.insert(path("ui/icons/bag"), handle.clone());

        assert!(cache.get(&path("ui/icons/bag")).unwrap().ptr_eq(&handle));
        assert!(cache.contains(&path("ui/icons/bag")));
        assert!(cache.get(&path("ui/icons/close")).is_none());
    }

    #[test]
    fn test_remove_package() {
        let mut cache = AssetCache::new();
        cache.insert(path("ui/a"), AssetHandle::new(Texture));
        cache.insert(path("ui/b"), AssetHandle::new(Texture));
        cache.insert(path("audio/click"), AssetHandle::new(Texture));

        assert_eq!(cache.keys_in("ui"), vec!["a", "b"]);
        assert_eq!(cache.remove_package("ui"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.keys_in("ui").is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = AssetCache::new();
        cache.insert(path("ui/a"), AssetHandle::new(Texture));
        assert!(cache.remove(&path("ui/a")).is_some());
        assert!(cache.remove(&path("ui/a")).is_none());

        cache.insert(path("ui/b"), AssetHandle::new(Texture));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_release_during_fetch_discards_result() {
        let mut cache = AssetCache::new();
        let before = cache.generation();
        cache.remove(&path("ui/a"));

        assert!(!cache.insert_unless_released(path("ui/a"), AssetHandle::new(Texture), before));
        assert!(cache.insert_unless_released(path("ui/b"), AssetHandle::new(Texture), before));
        assert!(cache.get(&path("ui/a")).is_none());

        let fresh = cache.generation();
        assert!(cache.insert_unless_released(path("ui/a"), AssetHandle::new(Texture), fresh));
    }

    #[test]
    fn test_package_and_full_releases_discard_results() {
        let mut cache = AssetCache::new();
        let before = cache.generation();
        cache.remove_package("ui");
        assert!(cache.released_since(&path("ui/a"), before));
        assert!(!cache.released_since(&path("audio/click"), before));

        let before = cache.generation();
        cache.clear();
        assert!(cache.released_since(&path("audio/click"), before));
        assert!(!cache.released_since(&path("audio/click"), cache.generation()));
    }
}
