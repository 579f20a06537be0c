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

use crate::error::PathFormatError;
use std::fmt;
use std::str::FromStr;

/// A parsed resource address, split into its owning package and the asset
/// path inside that package.
///
/// Both parts are guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    package: String,
    subpath: String,
}

impl ResourcePath {
    /// Splits an address on its first `/`.
    ///
    /// The package is the first segment and the subpath is every remaining
    /// segment joined back with `/`, so `"ui/panels/bag"` yields package `ui`
    /// and subpath `panels/bag`.
    ///
    /// # Errors
    /// Returns a [`PathFormatError`] if the address has fewer than two
    /// segments or if either part would be empty.
    pub fn parse(path: &str) -> Result<Self, PathFormatError> {
        let Some((package, subpath)) = path.split_once('/') else {
            return Err(PathFormatError::TooFewSegments {
                path: path.to_string(),
            });
        };
        if package.is_empty() {
            return Err(PathFormatError::EmptyPackage {
                path: path.to_string(),
            });
        }
        if subpath.is_empty() {
            return Err(PathFormatError::EmptySubpath {
                path: path.to_string(),
            });
        }
        Ok(Self {
            package: package.to_string(),
            subpath: subpath.to_string(),
        })
    }

    /// Builds an address from already separated parts.
    ///
    /// # Errors
    /// Returns a [`PathFormatError`] if either part is empty.
    pub fn new(
        package: impl Into<String>,
        subpath: impl Into<String>,
    ) -> Result<Self, PathFormatError> {
        let package = package.into();
        let subpath = subpath.into();
        if package.is_empty() {
            return Err(PathFormatError::EmptyPackage {
                path: format!("{package}/{subpath}"),
            });
        }
        if subpath.is_empty() {
            return Err(PathFormatError::EmptySubpath {
                path: format!("{package}/{subpath}"),
            });
        }
        Ok(Self { package, subpath })
    }

    /// The package that owns the asset.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The asset path inside the package.
    pub fn subpath(&self) -> &str {
        &self.subpath
    }

    /// Returns `true` if this address names `dir` itself or something below it.
    ///
    /// An empty `dir` is the package root and contains everything. Addresses
    /// always carry a subpath, so a whole package is loaded through
    /// `PackageAgent::get` with progress rather than as a directory.
    pub fn is_within(&self, dir: &str) -> bool {
        subpath_within(&self.subpath, dir)
    }
}

/// Directory membership on raw subpaths, shared with package manifests.
pub(crate) fn subpath_within(subpath: &str, dir: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        return true;
    }
    match subpath.strip_prefix(dir) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.subpath)
    }
}

impl FromStr for ResourcePath {
    type Err = PathFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
