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

use crate::resource::path::subpath_within;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// The package object returned by the engine's package fetch primitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageManifest {
    /// The package name.
    pub name: String,
    /// The full asset directory of the package, as subpaths.
    pub entries: Vec<String>,
}

impl PackageManifest {
    /// Creates a manifest from a name and its asset subpaths.
    pub fn new<I, S>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug)]
struct PackageInner {
    manifest: PackageManifest,
    prefetched: Mutex<BTreeSet<String>>,
}

/// A shared handle to a loaded package.
///
/// Every caller that awaited the same fetch receives a clone of the same
/// handle, so [`ptr_eq`](PackageHandle::ptr_eq) holds between them. The handle
/// also records which of the package's assets have been prefetched.
#[derive(Debug, Clone)]
pub struct PackageHandle(Arc<PackageInner>);

impl PackageHandle {
    /// Wraps a freshly fetched manifest.
    pub fn new(manifest: PackageManifest) -> Self {
        Self(Arc::new(PackageInner {
            manifest,
            prefetched: Mutex::new(BTreeSet::new()),
        }))
    }

    /// The package name.
    pub fn name(&self) -> &str {
        &self.0.manifest.name
    }

    /// The full asset directory of the package.
    pub fn entries(&self) -> &[String] {
        &self.0.manifest.entries
    }

    /// The entries equal to `dir` or below it, in directory order.
    pub fn entries_under(&self, dir: &str) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|entry| subpath_within(entry, dir))
            .cloned()
            .collect()
    }

    /// Records that `subpath` was loaded by a prefetch.
    pub fn mark_prefetched(&self, subpath: &str) {
        self.prefetched_set().insert(subpath.to_string());
    }

    /// Forgets a prefetched entry after it was released.
    pub fn forget_prefetched(&self, subpath: &str) -> bool {
        self.prefetched_set().remove(subpath)
    }

    /// Forgets every prefetched entry.
    pub fn clear_prefetched(&self) {
        self.prefetched_set().clear();
    }

    /// Returns `true` if `subpath` was loaded by a prefetch.
    pub fn is_prefetched(&self, subpath: &str) -> bool {
        self.prefetched_set().contains(subpath)
    }

    /// The asset keys this package has prefetched, sorted.
    pub fn prefetched(&self) -> Vec<String> {
        self.prefetched_set().iter().cloned().collect()
    }

    /// Returns `true` if both handles come from the same fetch.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn prefetched_set(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.0
            .prefetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
