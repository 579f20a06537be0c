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

use super::PackageManifest;
use crate::asset::AssetHandle;
use crate::error::FetchError;
use async_trait::async_trait;

/// The engine's package and asset fetch primitives.
///
/// This trait abstracts the engine asset manager that actually downloads
/// packages and decodes assets. Fetches are the only suspension points of the
/// loading subsystem; the agents decide *when* to call these methods and make
/// sure that a package is never fetched twice concurrently.
///
/// A concrete implementation lives with the engine integration. Tests use a
/// scripted in-memory source.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Fetches the package object for `name`.
    ///
    /// # Returns
    ///
    /// The package manifest, including its full asset directory.
    async fn fetch_package(&self, name: &str) -> Result<PackageManifest, FetchError>;

    /// Fetches a single asset from an already fetched package.
    async fn fetch_asset(&self, package: &str, subpath: &str) -> Result<AssetHandle, FetchError>;

    /// Asks the engine to release one asset.
    fn release_asset(&self, package: &str, subpath: &str);

    /// Asks the engine to release every asset of a package and unload the
    /// package object.
    fn release_package(&self, name: &str);

    /// Asks the engine to release every loaded asset.
    fn release_all(&self);
}
