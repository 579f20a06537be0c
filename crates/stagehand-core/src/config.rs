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

//! Configuration of the loading agents.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by the package, asset, and UI agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Timeout applied to every engine fetch, in milliseconds.
    /// `None` lets a stalled fetch block its caller indefinitely.
    pub fetch_timeout_ms: Option<u64>,
    /// Maximum number of asset fetches a prefetch or directory load keeps in
    /// flight at once. Values below 1 are treated as 1.
    pub max_concurrent_fetches: usize,
    /// Default `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: None,
            max_concurrent_fetches: 16,
            log_filter: "info".to_string(),
        }
    }
}

impl LoaderConfig {
    /// The fetch timeout as a [`Duration`], if one is configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// The effective fetch concurrency, never zero.
    pub fn fetch_concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }

    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Serializes the configuration to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}
