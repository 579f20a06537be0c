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

//! Packages: independently fetchable, named bundles of assets.
//!
//! This module defines the package object handed back by the engine
//! ([`PackageManifest`]), the shared handle the loading agents cache
//! ([`PackageHandle`]), and the async contract of the engine's fetch primitives
//! ([`PackageSource`]).

mod handle;
mod source;

pub use handle::{PackageHandle, PackageManifest};
pub use source::PackageSource;

/// Where a package is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageState {
    /// Nothing is known about the package, or it was released.
    NotLoaded,
    /// A fetch is in flight; new requesters attach to it.
    Loading,
    /// The package object is available.
    Loaded,
}
