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

//! # Stagehand Core
//!
//! Foundational crate containing the address format, error taxonomy, asset and
//! package handles, and the interface contracts that the loading and view
//! subsystems are built on.

#![warn(missing_docs)]

pub mod asset;
pub mod config;
pub mod error;
pub mod package;
pub mod progress;
pub mod resource;
pub mod view;

pub use config::LoaderConfig;
pub use error::{
    DisplayError, FetchError, LoadError, PathFormatError, ViewContractError,
};
pub use resource::ResourcePath;
