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

//! Acts as the **[A]gent** for UI views.
//!
//! The UI agent owns the view cache, the stack of views attached to the
//! display, and the primary view slot. View types are registered up front in
//! a [`ViewFactoryRegistry`]; showing a view loads its template through the
//! [`AssetAgent`](crate::AssetAgent) the first time and reuses the cached
//! [`ViewInstance`] afterwards.

mod agent;
mod factory;
mod instance;

pub use agent::UiAgent;
pub use factory::{ViewFactoryRegistry, ViewRegistration};
pub use instance::ViewInstance;

/// A shared handle to a cached view.
pub type ViewRef = std::sync::Arc<ViewInstance>;
