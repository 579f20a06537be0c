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

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::stream::{FuturesUnordered, StreamExt};
use stagehand_core::asset::AssetHandle;
use stagehand_core::package::{PackageHandle, PackageSource, PackageState};
use stagehand_core::progress::{FractionProgress, LoadProgress};
use stagehand_core::{LoadError, LoaderConfig, ResourcePath};
use stagehand_data::{AssetCache, DedupCache, SlotState};
use tokio::sync::Semaphore;

use crate::guard::FetchGuard;
use crate::task::{forward, LoadTask};

struct PackageAgentInner {
    source: Arc<dyn PackageSource>,
    packages: DedupCache<PackageHandle>,
    assets: RwLock<AssetCache>,
    fetch_slots: Semaphore,
    guard: FetchGuard,
    config: LoaderConfig,
}

/// Fetches packages exactly once and prefetches their assets.
///
/// Cloning the agent is cheap; clones share the same caches.
#[derive(Clone)]
pub struct PackageAgent {
    inner: Arc<PackageAgentInner>,
}

impl PackageAgent {
    /// Creates a new `PackageAgent` over the engine's fetch primitives.
    pub fn new(source: Arc<dyn PackageSource>, config: LoaderConfig) -> Self {
        Self {
            inner: Arc::new(PackageAgentInner {
                source,
                packages: DedupCache::new(),
                assets: RwLock::new(AssetCache::new()),
                fetch_slots: Semaphore::new(config.fetch_concurrency()),
                guard: FetchGuard::new(config.fetch_timeout()),
                config,
            }),
        }
    }

    /// Returns the package, fetching it if needed.
    ///
    /// With `on_progress`, every asset of the package is loaded once the
    /// package object is available and the fraction of settled assets is
    /// reported after each one. Failures are logged and yield `None`.
    pub async fn get(&self, name: &str, on_progress: Option<FractionProgress>) -> Option<PackageHandle> {
        match self.try_get(name, on_progress).await {
            Ok(package) => Some(package),
            Err(e) => {
                log::error!("Failed to load package '{name}': {e}");
                None
            }
        }
    }

    /// Fallible form of [`get`](Self::get).
    ///
    /// A failed package fetch is shared by every caller that was waiting on it
    /// and then forgotten, so the next call fetches again. A failed prefetch
    /// fails this call only; the package itself stays loaded.
    pub async fn try_get(
        &self,
        name: &str,
        on_progress: Option<FractionProgress>,
    ) -> Result<PackageHandle, LoadError> {
        let package = self
            .inner
            .packages
            .load(name, || self.fetch_package(name))
            .await?;

        if let Some(on_progress) = on_progress {
            self.prefetch(&package, on_progress).await?;
        }
        Ok(package)
    }

    /// Spawns [`try_get`](Self::try_get) with progress tracking on its own
    /// task.
    pub fn spawn_get(&self, name: &str) -> LoadTask<PackageHandle> {
        let agent = self.clone();
        let name = name.to_string();
        LoadTask::spawn(
            format!("load of package '{name}'"),
            self.inner.guard.child_token(),
            move |sender| async move {
                let on_progress: FractionProgress =
                    Box::new(move |fraction| forward(&sender, LoadProgress::Fraction(fraction)));
                agent.try_get(&name, Some(on_progress)).await
            },
        )
    }

    /// Where `name` is in its fetch lifecycle.
    pub fn state(&self, name: &str) -> PackageState {
        match self.inner.packages.state(name) {
            SlotState::Absent => PackageState::NotLoaded,
            SlotState::Pending => PackageState::Loading,
            SlotState::Ready => PackageState::Loaded,
        }
    }

    /// Returns `true` if the package object is available.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.state(name) == PackageState::Loaded
    }

    /// The handle of a loaded package, without fetching.
    pub fn loaded(&self, name: &str) -> Option<PackageHandle> {
        self.inner.packages.get(name)
    }

    /// The names of every loaded package, sorted.
    pub fn loaded_packages(&self) -> Vec<String> {
        self.inner.packages.ready_keys()
    }

    /// The configuration this agent was built with.
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Cancels every in-flight fetch and spawned load. Later fetches fail
    /// immediately with [`LoadError::Cancelled`].
    pub fn shutdown(&self) {
        log::info!("PackageAgent shutting down; cancelling in-flight fetches.");
        self.inner.guard.cancel();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.inner.guard.is_cancelled()
    }

    async fn fetch_package(&self, name: &str) -> Result<PackageHandle, LoadError> {
        log::debug!("Fetching package '{name}'");
        let mut manifest = self
            .inner
            .guard
            .run(
                format!("fetch of package '{name}'"),
                self.inner.source.fetch_package(name),
            )
            .await?
            .map_err(|source| LoadError::PackageFetch {
                package: name.to_string(),
                source,
            })?;

        if manifest.name != name {
            log::warn!(
                "Package '{name}' was delivered under the name '{}'",
                manifest.name
            );
            manifest.name = name.to_string();
        }
        log::info!(
            "Package '{name}' loaded ({} assets)",
            manifest.entries.len()
        );
        Ok(PackageHandle::new(manifest))
    }

    async fn prefetch(
        &self,
        package: &PackageHandle,
        mut on_progress: FractionProgress,
    ) -> Result<(), LoadError> {
        let total = package.entries().len();
        if total == 0 {
            // Delivered from a later task so that listeners attached right
            // after this call returns still observe it.
            tokio::spawn(async move { on_progress(1.0) });
            return Ok(());
        }

        let mut pending: FuturesUnordered<_> = package
            .entries()
            .iter()
            .map(|subpath| async move {
                self.fetch_entry(package, subpath)
                    .await
                    .map(|_| subpath.as_str())
            })
            .collect();

        let mut completed = 0;
        while let Some(result) = pending.next().await {
            let subpath = result?;
            package.mark_prefetched(subpath);
            completed += 1;
            log::trace!(
                "Prefetch of '{}': {completed}/{total}",
                package.name()
            );
            on_progress(completed as f32 / total as f32);
        }
        Ok(())
    }

    /// Returns the asset at `subpath` of `package`, fetching it if it is not
    /// cached yet.
    pub(crate) async fn fetch_entry(
        &self,
        package: &PackageHandle,
        subpath: &str,
    ) -> Result<AssetHandle, LoadError> {
        let path = ResourcePath::new(package.name(), subpath)?;
        let generation = {
            let assets = self.assets();
            if let Some(handle) = assets.get(&path) {
                return Ok(handle.clone());
            }
            assets.generation()
        };

        let stage = format!("fetch of asset '{path}'");
        let _permit = self
            .inner
            .fetch_slots
            .acquire()
            .await
            .map_err(|_| LoadError::Cancelled {
                stage: stage.clone(),
            })?;
        let handle = self
            .inner
            .guard
            .run(stage, self.inner.source.fetch_asset(package.name(), subpath))
            .await?
            .map_err(|source| LoadError::AssetFetch {
                path: path.to_string(),
                source,
            })?;

        let path_text = path.to_string();
        if !self
            .assets_mut()
            .insert_unless_released(path, handle.clone(), generation)
        {
            log::debug!("Asset '{path_text}' was released mid-fetch; discarding it");
            return Err(LoadError::Released { path: path_text });
        }
        log::trace!("Fetched asset '{path_text}'");
        Ok(handle)
    }

    pub(crate) fn cached_asset(&self, path: &ResourcePath) -> Option<AssetHandle> {
        self.assets().get(path).cloned()
    }

    pub(crate) fn source(&self) -> &dyn PackageSource {
        self.inner.source.as_ref()
    }

    pub(crate) fn forget_asset(&self, path: &ResourcePath) -> bool {
        self.assets_mut().remove(path).is_some()
    }

    /// Drops a loaded package and every cached asset it owns.
    pub(crate) fn forget_package(&self, name: &str) -> usize {
        self.inner.packages.remove(name);
        self.assets_mut().remove_package(name)
    }

    /// Drops every cached asset; package objects stay loaded.
    pub(crate) fn forget_all_assets(&self) {
        self.assets_mut().clear();
        for package in self.inner.packages.ready_values() {
            package.clear_prefetched();
        }
    }

    pub(crate) fn guard(&self) -> &FetchGuard {
        &self.inner.guard
    }

    fn assets(&self) -> RwLockReadGuard<'_, AssetCache> {
        self.inner
            .assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn assets_mut(&self) -> RwLockWriteGuard<'_, AssetCache> {
        self.inner
            .assets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
