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

//! # Stagehand Agents
//!
//! The agents that gameplay and UI code talk to:
//! - [`PackageAgent`] fetches packages exactly once and prefetches their assets.
//! - [`AssetAgent`] loads single assets and directories, and releases them.
//! - [`UiAgent`] owns the view cache, the open stack, and the primary view.
//!
//! Every operation has a fallible `try_*` form and a form that logs failures
//! and returns `None`/`false` instead, so a broken package never takes the
//! application down.

#![warn(missing_docs)]

pub mod asset_agent;
mod guard;
pub mod package_agent;
pub mod task;
pub mod ui_agent;

pub use asset_agent::AssetAgent;
pub use package_agent::PackageAgent;
pub use task::LoadTask;
pub use ui_agent::{UiAgent, ViewFactoryRegistry, ViewInstance, ViewRef, ViewRegistration};
