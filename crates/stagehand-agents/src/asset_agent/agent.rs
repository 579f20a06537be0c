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

//! The AssetAgent loads and releases assets addressed as `package/subpath`.

use futures::stream::{FuturesUnordered, StreamExt};
use stagehand_core::asset::AssetHandle;
use stagehand_core::progress::{Completion, CountProgress, LoadProgress};
use stagehand_core::{LoadError, ResourcePath};

use crate::package_agent::PackageAgent;
use crate::task::{forward, LoadTask};

/// Loads single assets and asset directories, and releases them.
///
/// Cloning the agent is cheap; clones share the package agent's caches.
#[derive(Clone)]
pub struct AssetAgent {
    packages: PackageAgent,
}

impl AssetAgent {
    /// Creates a new `AssetAgent` on top of a package agent.
    pub fn new(packages: PackageAgent) -> Self {
        Self { packages }
    }

    /// The package agent this agent loads through.
    pub fn packages(&self) -> &PackageAgent {
        &self.packages
    }

    /// Loads one asset.
    ///
    /// `on_complete` fires exactly once with the error or the asset. Failures
    /// (malformed address, package fetch failure, missing asset) are logged
    /// and yield `None`; their detail is only available through
    /// `on_complete`.
    pub async fn load_one(
        &self,
        path: &str,
        on_progress: Option<CountProgress>,
        on_complete: Option<Completion<AssetHandle>>,
    ) -> Option<AssetHandle> {
        let result = self.try_load_one(path, on_progress).await;
        settle("asset", path, result, on_complete)
    }

    /// Fallible form of [`load_one`](Self::load_one).
    pub async fn try_load_one(
        &self,
        path: &str,
        mut on_progress: Option<CountProgress>,
    ) -> Result<AssetHandle, LoadError> {
        let path = ResourcePath::parse(path)?;
        let package = self.packages.try_get(path.package(), None).await?;
        let handle = self.packages.fetch_entry(&package, path.subpath()).await?;
        if let Some(on_progress) = on_progress.as_mut() {
            on_progress(1, 1);
        }
        Ok(handle)
    }

    /// Loads every asset of the directory named by `path`.
    ///
    /// `path` must name a directory inside the package; `"pkg/"` is not an
    /// address. Load a whole package with
    /// [`PackageAgent::get`](crate::PackageAgent::get) and a progress
    /// callback instead.
    ///
    /// Progress is reported as `(completed, total)` in completion order. The
    /// first failing asset aborts the whole load; `on_complete` then fires
    /// once with that error and progress already reported stays reported.
    pub async fn load_dir(
        &self,
        path: &str,
        on_progress: Option<CountProgress>,
        on_complete: Option<Completion<Vec<AssetHandle>>>,
    ) -> Option<Vec<AssetHandle>> {
        let result = self.try_load_dir(path, on_progress).await;
        settle("directory", path, result, on_complete)
    }

    /// Fallible form of [`load_dir`](Self::load_dir). The assets are returned
    /// in directory order.
    pub async fn try_load_dir(
        &self,
        path: &str,
        mut on_progress: Option<CountProgress>,
    ) -> Result<Vec<AssetHandle>, LoadError> {
        let path = ResourcePath::parse(path)?;
        let package = self.packages.try_get(path.package(), None).await?;
        let entries = package.entries_under(path.subpath());
        let total = entries.len();
        if total == 0 {
            log::debug!("Directory '{path}' is empty");
            return Ok(Vec::new());
        }

        let mut loaded: Vec<Option<AssetHandle>> = vec![None; total];
        let mut pending: FuturesUnordered<_> = entries
            .iter()
            .enumerate()
            .map(|(index, subpath)| {
                let package = &package;
                async move { (index, self.packages.fetch_entry(package, subpath).await) }
            })
            .collect();

        let mut completed = 0;
        while let Some((index, result)) = pending.next().await {
            loaded[index] = Some(result?);
            completed += 1;
            if let Some(on_progress) = on_progress.as_mut() {
                on_progress(completed, total);
            }
        }
        drop(pending);

        Ok(loaded.into_iter().flatten().collect())
    }

    /// Spawns [`try_load_one`](Self::try_load_one) on its own task.
    pub fn spawn_load_one(&self, path: &str) -> LoadTask<AssetHandle> {
        let agent = self.clone();
        let path = path.to_string();
        LoadTask::spawn(
            format!("load of asset '{path}'"),
            self.packages.guard().child_token(),
            move |sender| async move {
                agent.try_load_one(&path, Some(count_forwarder(sender))).await
            },
        )
    }

    /// Spawns [`try_load_dir`](Self::try_load_dir) on its own task.
    pub fn spawn_load_dir(&self, path: &str) -> LoadTask<Vec<AssetHandle>> {
        let agent = self.clone();
        let path = path.to_string();
        LoadTask::spawn(
            format!("load of directory '{path}'"),
            self.packages.guard().child_token(),
            move |sender| async move {
                agent.try_load_dir(&path, Some(count_forwarder(sender))).await
            },
        )
    }

    /// The cached handle for `path`, without loading.
    pub fn cached(&self, path: &str) -> Option<AssetHandle> {
        let path = ResourcePath::parse(path).ok()?;
        self.packages.cached_asset(&path)
    }

    /// Releases one asset.
    ///
    /// Returns `false` and logs an error if the address is malformed or its
    /// package is not loaded.
    pub fn release(&self, path: &str) -> bool {
        let path = match ResourcePath::parse(path) {
            Ok(path) => path,
            Err(e) => {
                log::error!("Failed to release asset '{path}': {e}");
                return false;
            }
        };
        let Some(package) = self.packages.loaded(path.package()) else {
            log::error!(
                "Package '{}' is not loaded, cannot release asset '{}'",
                path.package(),
                path.subpath()
            );
            return false;
        };

        self.packages
            .source()
            .release_asset(path.package(), path.subpath());
        self.packages.forget_asset(&path);
        package.forget_prefetched(path.subpath());
        log::debug!("Released asset '{path}'");
        true
    }

    /// Releases every asset of a package and unloads the package object.
    /// Using the package again requires a fresh fetch.
    pub fn release_package(&self, name: &str) -> bool {
        if !self.packages.is_loaded(name) {
            log::error!("Package '{name}' is not loaded, cannot release its assets");
            return false;
        }
        self.packages.source().release_package(name);
        let dropped = self.packages.forget_package(name);
        log::info!("Released package '{name}' ({dropped} cached assets)");
        true
    }

    /// Releases every asset of every loaded package. Package objects stay
    /// loaded.
    pub fn release_all(&self) {
        self.packages.source().release_all();
        self.packages.forget_all_assets();
        log::info!("Released all assets");
    }
}

fn count_forwarder(sender: flume::Sender<LoadProgress>) -> CountProgress {
    Box::new(move |completed, total| forward(&sender, LoadProgress::Count { completed, total }))
}

/// Converts a result to the logged, `Option`-returning form and fires the
/// completion callback.
fn settle<T>(
    what: &str,
    path: &str,
    result: Result<T, LoadError>,
    on_complete: Option<Completion<T>>,
) -> Option<T> {
    match result {
        Ok(value) => {
            if let Some(on_complete) = on_complete {
                on_complete(None, Some(&value));
            }
            Some(value)
        }
        Err(e) => {
            log::error!("Failed to load {what} '{path}': {e}");
            if let Some(on_complete) = on_complete {
                on_complete(Some(&e), None);
            }
            None
        }
    }
}
