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

//! The public-facing Software Development Kit (SDK) for Stagehand.
//! This crate wires the package, asset and UI agents together behind a single
//! [`Stagehand`] value, loads the loader configuration and sets up logging.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use stagehand_agents::{AssetAgent, PackageAgent, UiAgent, ViewFactoryRegistry};
use stagehand_core::asset::{Asset, AssetHandle};
use stagehand_core::package::PackageSource;
use stagehand_core::view::{DisplayRoot, View, ViewDescriptor};
use stagehand_core::LoaderConfig;
use std::path::Path;
use std::sync::Arc;

/// The types gameplay and UI code usually need.
pub mod prelude {
    pub use crate::{Stagehand, StagehandBuilder};
    pub use stagehand_agents::{AssetAgent, LoadTask, PackageAgent, UiAgent, ViewRef};
    pub use stagehand_core::asset::{Asset, AssetHandle};
    pub use stagehand_core::package::{PackageHandle, PackageManifest, PackageSource, PackageState};
    pub use stagehand_core::progress::{Completion, CountProgress, FractionProgress, LoadProgress};
    pub use stagehand_core::view::{DisplayRoot, View, ViewDataStore, ViewDescriptor, ViewState};
    pub use stagehand_core::{FetchError, LoadError, LoaderConfig};
}

/// The loading and view subsystem of one application.
///
/// Every instance owns its own caches, so independent instances never share
/// packages, assets or views.
pub struct Stagehand {
    packages: PackageAgent,
    assets: AssetAgent,
    ui: UiAgent,
}

impl Stagehand {
    /// Starts building a `Stagehand` over the engine's fetch primitives and
    /// display root.
    pub fn builder(source: Arc<dyn PackageSource>, display: Arc<dyn DisplayRoot>) -> StagehandBuilder {
        StagehandBuilder {
            source,
            display,
            config: LoaderConfig::default(),
            factories: ViewFactoryRegistry::new(),
        }
    }

    /// The package agent.
    pub fn packages(&self) -> &PackageAgent {
        &self.packages
    }

    /// The asset agent.
    pub fn assets(&self) -> &AssetAgent {
        &self.assets
    }

    /// The UI agent.
    pub fn ui(&self) -> &UiAgent {
        &self.ui
    }

    /// The configuration the agents were built with.
    pub fn config(&self) -> &LoaderConfig {
        self.packages.config()
    }

    /// Cancels every in-flight fetch. Later loads fail with
    /// [`LoadError::Cancelled`](stagehand_core::LoadError::Cancelled).
    pub fn shutdown(&self) {
        self.packages.shutdown();
    }
}

/// Builds a [`Stagehand`]. View types are registered here, at startup.
pub struct StagehandBuilder {
    source: Arc<dyn PackageSource>,
    display: Arc<dyn DisplayRoot>,
    config: LoaderConfig,
    factories: ViewFactoryRegistry,
}

impl StagehandBuilder {
    /// Replaces the default configuration.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a view type under `name`, built by `factory` from its
    /// loaded template. A view whose `package/view_path` is already taken by
    /// another name is logged and skipped.
    pub fn register_view<V, F>(mut self, name: &str, factory: F) -> Self
    where
        V: View + ViewDescriptor,
        F: Fn(&AssetHandle) -> Result<V, String> + Send + Sync + 'static,
    {
        self.factories.register::<V, F>(name, factory);
        self
    }

    /// Registers a view type under `name`, built from a template asset of
    /// type `T`.
    pub fn register_view_template<V, T, F>(mut self, name: &str, build: F) -> Self
    where
        V: View + ViewDescriptor,
        T: Asset,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.factories.register_template::<V, T, F>(name, build);
        self
    }

    /// Wires the agents together.
    pub fn build(self) -> Stagehand {
        let packages = PackageAgent::new(self.source, self.config);
        let assets = AssetAgent::new(packages.clone());
        let ui = UiAgent::new(assets.clone(), self.display, self.factories);
        log::info!(
            "Stagehand ready (fetch timeout: {:?}, fetch concurrency: {})",
            packages.config().fetch_timeout(),
            packages.config().fetch_concurrency()
        );
        Stagehand {
            packages,
            assets,
            ui,
        }
    }
}

/// Loads a [`LoaderConfig`] from a RON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<LoaderConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read loader config '{}'", path.display()))?;
    let config = LoaderConfig::from_ron_str(&text)
        .with_context(|| format!("failed to parse loader config '{}'", path.display()))?;
    log::debug!("Loaded loader config from '{}'", path.display());
    Ok(config)
}

/// Installs the `env_logger` backend, using `filter` when `RUST_LOG` is not
/// set. Returns `false` if a logger was already installed.
pub fn init_logging(filter: &str) -> bool {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or(filter))
        .try_init()
        .is_ok()
}

/// Installs the `env_logger` backend with the configured
/// [`log_filter`](LoaderConfig::log_filter) as the fallback filter.
pub fn init_logging_from(config: &LoaderConfig) -> bool {
    init_logging(&config.log_filter)
}
