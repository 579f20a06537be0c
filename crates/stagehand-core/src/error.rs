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

//! Defines the hierarchy of error types for the loading and view subsystems.
//!
//! The leaf errors describe what went wrong in one collaborator (the address
//! parser, the engine fetch primitives, the view contract, the display). They
//! are folded into [`LoadError`], the single error type every agent operation
//! reports. `LoadError` is `Clone` because one failed fetch is shared by every
//! caller that was waiting on it.

use std::time::Duration;
use thiserror::Error;

/// A resource address that does not have the `package/subpath` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathFormatError {
    /// The address has no `/` separator at all.
    #[error("address '{path}' must contain a package and at least one path segment")]
    TooFewSegments {
        /// The rejected address.
        path: String,
    },
    /// The segment before the first `/` is empty.
    #[error("address '{path}' has an empty package name")]
    EmptyPackage {
        /// The rejected address.
        path: String,
    },
    /// Nothing follows the first `/`.
    #[error("address '{path}' has an empty subpath")]
    EmptySubpath {
        /// The rejected address.
        path: String,
    },
}

/// An error reported by one of the engine fetch primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The requested package or asset does not exist.
    #[error("'{0}' was not found")]
    NotFound(String),
    /// The transport failed while fetching.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The fetched data could not be decoded.
    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// A view registration that cannot produce a usable view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewContractError {
    /// No factory was registered under this name.
    #[error("no view is registered under the name '{name}'")]
    Unregistered {
        /// The requested view name.
        name: String,
    },
    /// The descriptor is missing its package or its view path.
    #[error("view '{name}' has an incomplete descriptor (package: '{package}', view path: '{view_path}')")]
    IncompleteDescriptor {
        /// The view name.
        name: String,
        /// The declared package, possibly empty.
        package: String,
        /// The declared view path, possibly empty.
        view_path: String,
    },
    /// The template asset could not be turned into a view.
    #[error("view '{name}' could not be instantiated: {reason}")]
    NotInstantiable {
        /// The view name.
        name: String,
        /// Why the factory rejected the template.
        reason: String,
    },
}

/// An error reported by the display attach/detach primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The display root has not been set up yet.
    #[error("display root is not available")]
    RootUnavailable,
    /// The display refused the operation.
    #[error("display rejected '{key}': {reason}")]
    Rejected {
        /// The view key.
        key: String,
        /// The reason given by the display.
        reason: String,
    },
}

/// The error type of every loading and view operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The address could not be parsed.
    #[error(transparent)]
    PathFormat(#[from] PathFormatError),
    /// The package object could not be fetched.
    #[error("failed to fetch package '{package}': {source}")]
    PackageFetch {
        /// The package name.
        package: String,
        /// The engine error.
        #[source]
        source: FetchError,
    },
    /// An individual asset could not be fetched.
    #[error("failed to fetch asset '{path}': {source}")]
    AssetFetch {
        /// The full resource address.
        path: String,
        /// The engine error.
        #[source]
        source: FetchError,
    },
    /// A view registration or template is unusable.
    #[error(transparent)]
    ViewContract(#[from] ViewContractError),
    /// The asset was released while it was still being fetched.
    #[error("'{path}' was released while it was being fetched")]
    Released {
        /// The full resource address.
        path: String,
    },
    /// The addressed view or asset is not in the cache.
    #[error("'{key}' is not cached")]
    CacheMiss {
        /// The cache key that was addressed.
        key: String,
    },
    /// The display refused to attach the view.
    #[error(transparent)]
    Display(#[from] DisplayError),
    /// The operation was cancelled before it settled.
    #[error("{stage} was cancelled")]
    Cancelled {
        /// What was being done, e.g. `fetch of package 'ui'`.
        stage: String,
    },
    /// A fetch did not settle within the configured timeout.
    #[error("{stage} timed out after {after:?}")]
    TimedOut {
        /// What was being done.
        stage: String,
        /// The configured timeout.
        after: Duration,
    },
}

impl LoadError {
    /// Shorthand for a [`LoadError::CacheMiss`].
    pub fn cache_miss(key: impl Into<String>) -> Self {
        Self::CacheMiss { key: key.into() }
    }

    /// Returns `true` for [`LoadError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
