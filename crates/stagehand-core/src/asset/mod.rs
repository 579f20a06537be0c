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

//! Provides the foundational traits and handle type for loaded assets.
//!
//! Assets are owned by the engine's asset manager. This crate only carries
//! opaque, reference-counted handles to them and decides when loading or
//! releasing is requested.

mod handle;

pub use handle::*;

/// A marker trait for types that can be handed out as assets.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: The asset can be shared between the tasks that await it.
/// - `'static`: The asset does not borrow anything, so it can live in a cache
///   for the lifetime of the application.
///
/// # Examples
///
/// ```
/// use stagehand_core::asset::Asset;
///
/// // A template from which a view is instantiated.
/// struct Prefab {
///     // ... fields
/// }
///
/// impl Asset for Prefab {}
/// ```
pub trait Asset: Send + Sync + 'static {}
