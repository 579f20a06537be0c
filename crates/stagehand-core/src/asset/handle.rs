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

use super::Asset;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A thread-safe, reference-counted, type-erased handle to a loaded asset.
///
/// The loading layer does not know what kind of asset an address names, so the
/// handle is opaque; the consumer recovers the concrete type with
/// [`downcast_ref`](AssetHandle::downcast_ref). Cloning a handle is cheap, as it
/// only increments the reference count and does not duplicate the asset.
#[derive(Clone)]
pub struct AssetHandle(Arc<dyn Any + Send + Sync>);

impl AssetHandle {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    ///
    /// This is typically called by a `PackageSource` once an asset has been
    /// fetched.
    pub fn new<T: Asset>(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Returns the asset as `T`, or `None` if it holds another type.
    pub fn downcast_ref<T: Asset>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the asset is a `T`.
    pub fn is<T: Asset>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Returns `true` if both handles point at the same asset allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssetHandle")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Prefab(u32);
    impl Asset for Prefab {}

    struct Clip;
    impl Asset for Clip {}

    #[test]
    fn test_downcast() {
        let handle = AssetHandle::new(Prefab(7));
        assert_eq!(handle.downcast_ref::<Prefab>(), Some(&Prefab(7)));
        assert!(handle.downcast_ref::<Clip>().is_none());
        assert!(handle.is::<Prefab>());
    }

    #[test]
    fn test_clone_shares_allocation() {
        let handle = AssetHandle::new(Prefab(1));
        let other = handle.clone();
        assert!(handle.ptr_eq(&other));
        assert!(!handle.ptr_eq(&AssetHandle::new(Prefab(1))));
    }
}
