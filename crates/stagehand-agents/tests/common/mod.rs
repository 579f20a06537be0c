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

//! Scripted collaborators shared by the agent integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use stagehand_core::asset::{Asset, AssetHandle};
use stagehand_core::package::{PackageManifest, PackageSource};
use stagehand_core::view::DisplayRoot;
use stagehand_core::{DisplayError, FetchError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// The asset type served by [`MockSource`]: its own address.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob(pub String);
impl Asset for Blob {}

#[derive(Debug, Clone)]
enum Outcome {
    /// Succeeds after yielding to the scheduler this many times.
    Ready(usize),
    /// Fails after yielding to the scheduler this many times.
    Fail(FetchError, usize),
    Stall,
}

#[derive(Debug, Clone)]
struct PackageScript {
    entries: Vec<String>,
    outcome: Outcome,
}

/// A package source whose packages and assets are scripted per test.
///
/// Every package fetch yields once before settling. Assets succeed unless
/// scripted otherwise.
#[derive(Default)]
pub struct MockSource {
    packages: Mutex<HashMap<String, PackageScript>>,
    assets: Mutex<HashMap<String, Outcome>>,
    package_fetches: Mutex<HashMap<String, usize>>,
    asset_fetches: Mutex<HashMap<String, usize>>,
    released: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a package and its entries.
    pub fn with_package(self, name: &str, entries: &[&str]) -> Self {
        self.packages.lock().unwrap().insert(
            name.to_string(),
            PackageScript {
                entries: entries.iter().map(|e| e.to_string()).collect(),
                outcome: Outcome::Ready(1),
            },
        );
        self
    }

    /// Makes the asset settle only after `yields` scheduler turns.
    pub fn with_asset_delay(self, path: &str, yields: usize) -> Self {
        self.assets
            .lock()
            .unwrap()
            .insert(path.to_string(), Outcome::Ready(yields));
        self
    }

    /// Makes the asset fail with [`FetchError::NotFound`] after `yields`
    /// scheduler turns.
    pub fn with_missing_asset(self, path: &str, yields: usize) -> Self {
        self.assets.lock().unwrap().insert(
            path.to_string(),
            Outcome::Fail(FetchError::NotFound(path.to_string()), yields),
        );
        self
    }

    /// Makes the asset fetch never settle.
    pub fn with_stalled_asset(self, path: &str) -> Self {
        self.assets
            .lock()
            .unwrap()
            .insert(path.to_string(), Outcome::Stall);
        self
    }

    /// Makes fetches of `name` fail with a transport error.
    pub fn fail_package(&self, name: &str) {
        self.set_package_outcome(name, Outcome::Fail(FetchError::Transport("connection reset".into()), 1));
    }

    /// Makes fetches of `name` succeed again.
    pub fn heal_package(&self, name: &str) {
        self.set_package_outcome(name, Outcome::Ready(1));
    }

    /// Makes fetches of `name` never settle.
    pub fn stall_package(&self, name: &str) {
        self.set_package_outcome(name, Outcome::Stall);
    }

    pub fn package_fetches(&self, name: &str) -> usize {
        self.package_fetches.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn asset_fetches(&self, path: &str) -> usize {
        self.asset_fetches.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_asset_fetches(&self) -> usize {
        self.asset_fetches.lock().unwrap().values().sum()
    }

    /// Release calls received, as `asset:<path>`, `package:<name>` or `all`.
    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    fn set_package_outcome(&self, name: &str, outcome: Outcome) {
        let mut packages = self.packages.lock().unwrap();
        let script = packages.entry(name.to_string()).or_insert(PackageScript {
            entries: Vec::new(),
            outcome: Outcome::Ready(1),
        });
        script.outcome = outcome;
    }

    async fn settle(outcome: Outcome) -> Result<(), FetchError> {
        let yields = match &outcome {
            Outcome::Ready(yields) | Outcome::Fail(_, yields) => *yields,
            Outcome::Stall => return std::future::pending().await,
        };
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }
        match outcome {
            Outcome::Fail(e, _) => Err(e),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PackageSource for MockSource {
    async fn fetch_package(&self, name: &str) -> Result<PackageManifest, FetchError> {
        *self
            .package_fetches
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        let script = self.packages.lock().unwrap().get(name).cloned();
        let Some(script) = script else {
            tokio::task::yield_now().await;
            return Err(FetchError::NotFound(name.to_string()));
        };
        Self::settle(script.outcome).await?;
        Ok(PackageManifest::new(name, script.entries))
    }

    async fn fetch_asset(&self, package: &str, subpath: &str) -> Result<AssetHandle, FetchError> {
        let path = format!("{package}/{subpath}");
        *self
            .asset_fetches
            .lock()
            .unwrap()
            .entry(path.clone())
            .or_default() += 1;
        let outcome = self
            .assets
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or(Outcome::Ready(0));
        Self::settle(outcome).await?;
        Ok(AssetHandle::new(Blob(path)))
    }

    fn release_asset(&self, package: &str, subpath: &str) {
        self.released
            .lock()
            .unwrap()
            .push(format!("asset:{package}/{subpath}"));
    }

    fn release_package(&self, name: &str) {
        self.released.lock().unwrap().push(format!("package:{name}"));
    }

    fn release_all(&self) {
        self.released.lock().unwrap().push("all".to_string());
    }
}

/// A display root recording every call as `attach:<key>`, `detach:<key>` or
/// `destroy:<key>`.
#[derive(Default)]
pub struct RecordingDisplay {
    calls: Mutex<Vec<String>>,
    attached: Mutex<Vec<String>>,
    rejected: Mutex<HashSet<String>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes attaching `key` fail.
    pub fn reject(&self, key: &str) {
        self.rejected.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// The attached keys, bottom to top.
    pub fn attached(&self) -> Vec<String> {
        self.attached.lock().unwrap().clone()
    }
}

impl DisplayRoot for RecordingDisplay {
    fn attach(&self, key: &str) -> Result<(), DisplayError> {
        if self.rejected.lock().unwrap().contains(key) {
            return Err(DisplayError::Rejected {
                key: key.to_string(),
                reason: "scripted rejection".to_string(),
            });
        }
        self.calls.lock().unwrap().push(format!("attach:{key}"));
        let mut attached = self.attached.lock().unwrap();
        attached.retain(|k| k != key);
        attached.push(key.to_string());
        Ok(())
    }

    fn detach(&self, key: &str) {
        self.calls.lock().unwrap().push(format!("detach:{key}"));
        self.attached.lock().unwrap().retain(|k| k != key);
    }

    fn destroy(&self, key: &str) {
        self.calls.lock().unwrap().push(format!("destroy:{key}"));
        self.attached.lock().unwrap().retain(|k| k != key);
    }
}
