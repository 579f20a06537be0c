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

//! The UiAgent shows, hides and disposes cached views.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stagehand_core::view::{DisplayRoot, ViewState};
use stagehand_core::{LoadError, ViewContractError};
use stagehand_data::DedupCache;

use super::factory::{ViewFactoryRegistry, ViewRegistration};
use super::instance::ViewInstance;
use super::ViewRef;
use crate::asset_agent::AssetAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Replaces the primary view.
    Primary,
    /// Stacks on top without touching the primary view.
    Window,
}

/// The views attached to the display.
#[derive(Default)]
struct Stage {
    open: Vec<ViewRef>,
    primary: Option<ViewRef>,
}

impl Stage {
    /// Drops `view` from the open stack and the primary slot.
    fn forget(&mut self, view: &ViewRef) {
        self.open.retain(|open| !Arc::ptr_eq(open, view));
        if self
            .primary
            .as_ref()
            .is_some_and(|primary| Arc::ptr_eq(primary, view))
        {
            self.primary = None;
        }
    }
}

/// Manages cached views, the open stack and the primary view.
pub struct UiAgent {
    assets: AssetAgent,
    display: Arc<dyn DisplayRoot>,
    factories: ViewFactoryRegistry,
    views: DedupCache<ViewRef>,
    stage: Mutex<Stage>,
}

impl UiAgent {
    /// Creates a new `UiAgent`.
    pub fn new(assets: AssetAgent, display: Arc<dyn DisplayRoot>, factories: ViewFactoryRegistry) -> Self {
        log::info!("UiAgent created with {} registered views", factories.len());
        Self {
            assets,
            display,
            factories,
            views: DedupCache::new(),
            stage: Mutex::new(Stage::default()),
        }
    }

    /// The registered view types.
    pub fn factories(&self) -> &ViewFactoryRegistry {
        &self.factories
    }

    /// Shows the view registered as `name` as the primary view.
    ///
    /// A different primary view is detached but stays cached. Failures
    /// (unregistered name, incomplete descriptor, missing template, display
    /// refusal) are logged and yield `None`.
    pub async fn show_primary(&self, name: &str) -> Option<ViewRef> {
        self.show(name, Placement::Primary).await
    }

    /// Fallible form of [`show_primary`](Self::show_primary).
    pub async fn try_show_primary(&self, name: &str) -> Result<ViewRef, LoadError> {
        self.try_show(name, Placement::Primary).await
    }

    /// Shows the view registered as `name` on top of the open stack,
    /// leaving the primary view attached beneath it.
    pub async fn show_window(&self, name: &str) -> Option<ViewRef> {
        self.show(name, Placement::Window).await
    }

    /// Fallible form of [`show_window`](Self::show_window).
    pub async fn try_show_window(&self, name: &str) -> Result<ViewRef, LoadError> {
        self.try_show(name, Placement::Window).await
    }

    /// Removes `view` from the open stack.
    ///
    /// Without `dispose` the view is only detached and stays cached. With
    /// `dispose` it is evicted and destroyed along with its store, and its
    /// template is released so the next show loads it again.
    pub fn hide(&self, view: &ViewRef, dispose: bool) {
        if !self.is_current(view) {
            log::error!("Cannot hide view '{}': {}", view.key(), LoadError::cache_miss(view.key()));
            return;
        }
        self.stage().forget(view);

        if !dispose {
            self.display.detach(view.key());
            view.detach();
            log::debug!("View '{}' hidden", view.key());
            return;
        }

        if self
            .views
            .remove_if(view.key(), |cached| Arc::ptr_eq(cached, view))
            .is_none()
        {
            log::error!("View '{}' was evicted while being disposed", view.key());
            return;
        }
        self.display.destroy(view.key());
        view.destroy();
        if self.assets.cached(view.key()).is_some() {
            self.assets.release(view.key());
        }
        log::info!("View '{}' disposed", view.key());
    }

    /// Stores `value` under `key` in the view's store. Logs and does nothing
    /// if the view is not cached.
    pub fn set_data<T: Send + Sync + 'static>(&self, view: &ViewRef, key: &str, value: T) {
        if let Err(e) = self.ensure_cached(view).and_then(|_| view.set_data(key, value)) {
            log::error!("Failed to set '{key}' on view '{}': {e}", view.key());
        }
    }

    /// A clone of the value under `key` in the view's store. Logs and returns
    /// `None` if the view is not cached.
    pub fn get_data<T: Clone + Send + Sync + 'static>(&self, view: &ViewRef, key: &str) -> Option<T> {
        match self.ensure_cached(view).and_then(|_| view.get_data(key)) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to get '{key}' from view '{}': {e}", view.key());
                None
            }
        }
    }

    /// Removes `key` from the view's store. Logs and does nothing if the view
    /// is not cached.
    pub fn delete_data(&self, view: &ViewRef, key: &str) {
        if let Err(e) = self.ensure_cached(view).and_then(|_| view.delete_data(key)) {
            log::error!("Failed to delete '{key}' from view '{}': {e}", view.key());
        }
    }

    /// Clears the view's store. Logs and does nothing if the view is not
    /// cached.
    pub fn clear_data(&self, view: &ViewRef) {
        if let Err(e) = self.ensure_cached(view).and_then(|_| view.clear_data()) {
            log::error!("Failed to clear view '{}': {e}", view.key());
        }
    }

    /// The current primary view.
    pub fn primary(&self) -> Option<ViewRef> {
        self.stage().primary.clone()
    }

    /// The views attached to the display, bottom to top.
    pub fn open_views(&self) -> Vec<ViewRef> {
        self.stage().open.clone()
    }

    /// The cached instance of the view registered as `name`, without loading.
    pub fn cached(&self, name: &str) -> Option<ViewRef> {
        let registration = self.factories.get(name)?;
        self.views.get(&registration.cache_key())
    }

    /// Returns `true` if the view registered as `name` is cached.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }

    async fn show(&self, name: &str, placement: Placement) -> Option<ViewRef> {
        match self.try_show(name, placement).await {
            Ok(view) => Some(view),
            Err(e) => {
                log::error!("Failed to show view '{name}': {e}");
                None
            }
        }
    }

    async fn try_show(&self, name: &str, placement: Placement) -> Result<ViewRef, LoadError> {
        let registration = self
            .factories
            .get(name)
            .ok_or_else(|| ViewContractError::Unregistered {
                name: name.to_string(),
            })?;
        registration.validate()?;

        let key = registration.cache_key();
        let view = self
            .views
            .load(&key, || self.instantiate(&registration, &key))
            .await?;
        self.present(&view, placement)?;
        Ok(view)
    }

    async fn instantiate(&self, registration: &ViewRegistration, key: &str) -> Result<ViewRef, LoadError> {
        log::debug!("Loading template '{key}' for view '{}'", registration.name());
        let template = self.assets.try_load_one(key, None).await?;
        let view = registration.instantiate(&template)?;
        log::info!("View '{}' instantiated from '{key}'", registration.name());
        Ok(Arc::new(ViewInstance::new(registration.name(), key, view)))
    }

    /// Attaches `view` to the display and records it in the open stack.
    fn present(&self, view: &ViewRef, placement: Placement) -> Result<(), LoadError> {
        let previous = match placement {
            Placement::Primary => self
                .primary()
                .filter(|primary| !Arc::ptr_eq(primary, view)),
            Placement::Window => None,
        };
        if let Some(previous) = &previous {
            self.detach(previous);
        }
        // Re-showing an attached view refreshes it.
        if view.state() == ViewState::Shown {
            self.detach(view);
        }

        if let Err(e) = self.display.attach(view.key()) {
            self.stage().forget(view);
            if let Some(previous) = &previous {
                self.restore(previous);
            }
            return Err(e.into());
        }
        view.attach();

        let mut stage = self.stage();
        stage.open.retain(|open| !Arc::ptr_eq(open, view));
        if let Some(previous) = &previous {
            stage.forget(previous);
        }
        stage.open.push(view.clone());
        if placement == Placement::Primary {
            stage.primary = Some(view.clone());
        }
        log::debug!("View '{}' attached as {placement:?}", view.key());
        Ok(())
    }

    fn detach(&self, view: &ViewRef) {
        self.display.detach(view.key());
        view.detach();
    }

    /// Re-attaches a primary view that was detached for a show that failed.
    fn restore(&self, view: &ViewRef) {
        match self.display.attach(view.key()) {
            Ok(()) => view.attach(),
            Err(e) => {
                log::warn!("Could not restore view '{}': {e}", view.key());
                self.stage().forget(view);
            }
        }
    }

    /// Returns `true` if `view` is the instance currently cached under its key.
    fn is_current(&self, view: &ViewRef) -> bool {
        self.views
            .get(view.key())
            .is_some_and(|cached| Arc::ptr_eq(&cached, view))
    }

    fn ensure_cached(&self, view: &ViewRef) -> Result<(), LoadError> {
        if self.is_current(view) {
            Ok(())
        } else {
            Err(LoadError::cache_miss(view.key()))
        }
    }

    fn stage(&self) -> MutexGuard<'_, Stage> {
        self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
