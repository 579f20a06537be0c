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

//! Timeout and cancellation around engine fetches.

use stagehand_core::LoadError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wraps every engine fetch so that it can neither outlive a shutdown nor
/// stall forever when a timeout is configured.
#[derive(Debug, Clone)]
pub(crate) struct FetchGuard {
    timeout: Option<Duration>,
    token: CancellationToken,
}

impl FetchGuard {
    pub(crate) fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            token: CancellationToken::new(),
        }
    }

    /// Awaits `fetch`, failing with `Cancelled` on shutdown or `TimedOut` once
    /// the configured timeout elapses. The fetch future is dropped in both
    /// cases.
    pub(crate) async fn run<F: Future>(&self, stage: String, fetch: F) -> Result<F::Output, LoadError> {
        let bounded = async {
            match self.timeout {
                Some(after) => tokio::time::timeout(after, fetch).await.map_err(|_| {
                    log::warn!("{stage} did not settle within {after:?}");
                    LoadError::TimedOut {
                        stage: stage.clone(),
                        after,
                    }
                }),
                None => Ok(fetch.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                log::warn!("{stage} was cancelled by shutdown");
                Err(LoadError::Cancelled { stage: stage.clone() })
            }
            result = bounded => result,
        }
    }

    /// A token cancelled together with this guard.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
