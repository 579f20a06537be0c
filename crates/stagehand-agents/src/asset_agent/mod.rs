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

//! Acts as the **[A]gent** for individual assets.
//!
//! This module is the public-facing API for loading assets by address and
//! releasing them. It resolves the address, makes sure the owning package is
//! loaded through the [`PackageAgent`](crate::PackageAgent), and then loads
//! one asset or a whole directory of assets from it.

mod agent;

pub use agent::AssetAgent;
