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

//! Spawned loads exposing a result, a progress stream, and cancellation.

use stagehand_core::progress::LoadProgress;
use stagehand_core::LoadError;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A load running on its own task.
///
/// Progress events are delivered on [`progress`](LoadTask::progress) in the
/// order they happen. [`cancel`](LoadTask::cancel) drops the in-flight engine
/// fetches of this load; a deduplicated package fetch shared with other
/// callers is taken over by the next waiter.
#[derive(Debug)]
pub struct LoadTask<T> {
    progress: flume::Receiver<LoadProgress>,
    token: CancellationToken,
    handle: JoinHandle<Result<T, LoadError>>,
}

impl<T: Send + 'static> LoadTask<T> {
    /// Spawns the future built by `make`, handing it the sending half of the
    /// progress stream. `token` cancels the task.
    pub(crate) fn spawn<F, Fut>(label: String, token: CancellationToken, make: F) -> Self
    where
        F: FnOnce(flume::Sender<LoadProgress>) -> Fut,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        let (sender, progress) = flume::unbounded();
        let load = make(sender);
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    log::debug!("{label} cancelled");
                    Err(LoadError::Cancelled { stage: label })
                }
                result = load => result,
            }
        });
        Self {
            progress,
            token,
            handle,
        }
    }

    /// The progress stream of this load.
    pub fn progress(&self) -> &flume::Receiver<LoadProgress> {
        &self.progress
    }

    /// Cancels the load. Has no effect once it has settled.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the load has settled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the load to settle.
    pub async fn join(self) -> Result<T, LoadError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Load task failed to complete: {e}");
                Err(LoadError::Cancelled {
                    stage: format!("load task ({e})"),
                })
            }
        }
    }
}

/// Forwards progress into a stream, ignoring a dropped receiver.
pub(crate) fn forward(sender: &flume::Sender<LoadProgress>, event: LoadProgress) {
    if sender.send(event).is_err() {
        log::trace!("Progress receiver dropped; event discarded.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_result_and_progress() {
        let task = LoadTask::spawn("test".to_string(), CancellationToken::new(), |sender| async move {
            forward(&sender, LoadProgress::Fraction(0.5));
            forward(&sender, LoadProgress::Fraction(1.0));
            Ok(3u32)
        });
        let progress = task.progress().clone();
        assert_eq!(task.join().await, Ok(3));
        let events: Vec<LoadProgress> = progress.drain().collect();
        assert_eq!(
            events,
            vec![LoadProgress::Fraction(0.5), LoadProgress::Fraction(1.0)]
        );
    }

    #[tokio::test]
    async fn test_cancel_before_settling() {
        let task = LoadTask::<u32>::spawn("stalled".to_string(), CancellationToken::new(), |_| async {
            std::future::pending::<()>().await;
            Ok(0)
        });
        task.cancel();
        assert!(matches!(task.join().await, Err(LoadError::Cancelled { .. })));
    }
}
