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

//! Acts as the **[A]gent** for packages.
//!
//! The package agent is the only component that fetches package objects. It
//! guarantees that at most one fetch per package name is in flight: callers
//! arriving while a package is loading attach to the pending fetch and receive
//! the same handle. It can also prefetch every asset of a package while
//! reporting aggregate progress.
//!
//! The agent owns the process-wide package cache and asset cache; the
//! [`AssetAgent`](crate::AssetAgent) reaches them through crate-internal
//! accessors.

mod agent;

pub use agent::PackageAgent;
