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

mod common;

use common::MockSource;
use stagehand_agents::PackageAgent;
use stagehand_core::package::PackageState;
use stagehand_core::progress::LoadProgress;
use stagehand_core::{FetchError, LoadError, LoaderConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn agent_over(source: &Arc<MockSource>) -> PackageAgent {
    PackageAgent::new(source.clone(), LoaderConfig::default())
}

#[tokio::test]
async fn test_concurrent_gets_share_one_fetch() {
    let source = Arc::new(MockSource::new().with_package("SubGame_003", &["OneUI", "TwoUI"]));
    let agent = agent_over(&source);

    let (a, b, c) = tokio::join!(
        agent.get("SubGame_003", None),
        agent.get("SubGame_003", None),
        agent.get("SubGame_003", None)
    );

    assert_eq!(source.package_fetches("SubGame_003"), 1);
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(a.ptr_eq(&b) && b.ptr_eq(&c));
    assert_eq!(agent.state("SubGame_003"), PackageState::Loaded);
    assert_eq!(agent.loaded_packages(), vec!["SubGame_003".to_string()]);

    // Already loaded: no further fetch.
    agent.get("SubGame_003", None).await.unwrap();
    assert_eq!(source.package_fetches("SubGame_003"), 1);
}

#[tokio::test]
async fn test_empty_package_progress_is_deferred() {
    let source = Arc::new(MockSource::new().with_package("Empty", &[]));
    let agent = agent_over(&source);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let (counter, values) = (calls.clone(), seen.clone());
    let package = agent
        .get(
            "Empty",
            Some(Box::new(move |fraction: f32| {
                counter.fetch_add(1, Ordering::SeqCst);
                values.lock().unwrap().push(fraction);
            })),
        )
        .await;

    assert!(package.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 0, "progress must not fire synchronously");

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![1.0]);
}

#[tokio::test]
async fn test_progress_covers_every_asset() {
    let source = Arc::new(
        MockSource::new()
            .with_package("hud", &["a", "b", "c", "d"])
            .with_asset_delay("hud/a", 3)
            .with_asset_delay("hud/c", 1),
    );
    let agent = agent_over(&source);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let values = seen.clone();
    let package = agent
        .try_get(
            "hud",
            Some(Box::new(move |fraction: f32| values.lock().unwrap().push(fraction))),
        )
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);
    assert_eq!(package.prefetched(), vec!["a", "b", "c", "d"]);
    assert_eq!(source.total_asset_fetches(), 4);

    // A second tracked get finds everything cached and still completes.
    let values = seen.clone();
    agent
        .try_get(
            "hud",
            Some(Box::new(move |fraction: f32| values.lock().unwrap().push(fraction))),
        )
        .await
        .unwrap();
    assert_eq!(source.total_asset_fetches(), 4);
    assert_eq!(seen.lock().unwrap().last(), Some(&1.0));
}

#[tokio::test]
async fn test_failed_fetch_is_forgotten_and_retried() {
    let source = Arc::new(MockSource::new().with_package("shop", &["Counter"]));
    source.fail_package("shop");
    let agent = agent_over(&source);

    let (a, b) = tokio::join!(agent.try_get("shop", None), agent.try_get("shop", None));
    let expected = LoadError::PackageFetch {
        package: "shop".to_string(),
        source: FetchError::Transport("connection reset".to_string()),
    };
    assert_eq!(a.unwrap_err(), expected);
    assert_eq!(b.unwrap_err(), expected);
    assert_eq!(source.package_fetches("shop"), 1);
    assert_eq!(agent.state("shop"), PackageState::NotLoaded);

    source.heal_package("shop");
    assert!(agent.get("shop", None).await.is_some());
    assert_eq!(source.package_fetches("shop"), 2);
    assert!(agent.is_loaded("shop"));
}

#[tokio::test]
async fn test_unknown_package_yields_none() {
    let source = Arc::new(MockSource::new());
    let agent = agent_over(&source);

    assert!(agent.get("nowhere", None).await.is_none());
    assert!(matches!(
        agent.try_get("nowhere", None).await,
        Err(LoadError::PackageFetch {
            source: FetchError::NotFound(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_prefetch_failure_keeps_package_loaded() {
    let source = Arc::new(
        MockSource::new()
            .with_package("bag", &["icon", "frame"])
            .with_missing_asset("bag/frame", 0),
    );
    let agent = agent_over(&source);

    let result = agent.try_get("bag", Some(Box::new(|_: f32| {}))).await;

    assert!(matches!(result, Err(LoadError::AssetFetch { ref path, .. }) if path == "bag/frame"));
    assert!(agent.is_loaded("bag"));
    assert!(!agent.loaded("bag").unwrap().is_prefetched("frame"));
}

#[tokio::test]
async fn test_stalled_fetch_times_out() {
    let source = Arc::new(MockSource::new().with_package("slow", &[]));
    source.stall_package("slow");
    let config = LoaderConfig {
        fetch_timeout_ms: Some(20),
        ..LoaderConfig::default()
    };
    let agent = PackageAgent::new(source.clone(), config);

    let result = agent.try_get("slow", None).await;

    assert!(matches!(
        result,
        Err(LoadError::TimedOut { after, .. }) if after == Duration::from_millis(20)
    ));
    assert_eq!(agent.state("slow"), PackageState::NotLoaded);
}

#[tokio::test]
async fn test_shutdown_cancels_spawned_loads() {
    let source = Arc::new(MockSource::new().with_package("slow", &[]));
    source.stall_package("slow");
    let agent = agent_over(&source);

    let task = agent.spawn_get("slow");
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(agent.state("slow"), PackageState::Loading);

    agent.shutdown();
    let result = task.join().await;
    assert!(result.unwrap_err().is_cancelled());
    assert!(agent.is_shut_down());

    // Later fetches fail straight away.
    source.heal_package("slow");
    assert!(agent.try_get("slow", None).await.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_spawned_get_streams_progress() {
    let source = Arc::new(MockSource::new().with_package("hud", &["a", "b"]));
    let agent = agent_over(&source);

    let task = agent.spawn_get("hud");
    let progress = task.progress().clone();
    let package = task.join().await.unwrap();

    assert_eq!(package.name(), "hud");
    let events: Vec<LoadProgress> = progress.drain().collect();
    assert_eq!(
        events,
        vec![LoadProgress::Fraction(0.5), LoadProgress::Fraction(1.0)]
    );
}

#[tokio::test]
async fn test_cancelling_one_task_leaves_other_callers_unaffected() {
    let source = Arc::new(MockSource::new().with_package("hud", &[]));
    let agent = agent_over(&source);

    let task = agent.spawn_get("hud");
    task.cancel();
    assert!(task.join().await.unwrap_err().is_cancelled());

    assert!(agent.get("hud", None).await.is_some());
    assert!(!agent.is_shut_down());
}

#[tokio::test]
async fn test_cancelled_fetch_does_not_stay_loading() {
    let source = Arc::new(MockSource::new().with_package("slow", &[]));
    source.stall_package("slow");
    let agent = agent_over(&source);

    let task = agent.spawn_get("slow");
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(agent.state("slow"), PackageState::Loading);

    task.cancel();
    assert!(task.join().await.unwrap_err().is_cancelled());
    assert_eq!(agent.state("slow"), PackageState::NotLoaded);

    source.heal_package("slow");
    assert!(agent.get("slow", None).await.is_some());
    assert_eq!(source.package_fetches("slow"), 2);
}

#[tokio::test]
async fn test_cancelled_fetch_is_taken_over_by_other_waiter() {
    let source = Arc::new(MockSource::new().with_package("slow", &[]));
    source.stall_package("slow");
    let agent = agent_over(&source);

    let first = agent.spawn_get("slow");
    let second = agent.spawn_get("slow");
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(source.package_fetches("slow"), 1);

    source.heal_package("slow");
    first.cancel();
    assert!(first.join().await.unwrap_err().is_cancelled());

    assert_eq!(second.join().await.unwrap().name(), "slow");
    assert_eq!(agent.state("slow"), PackageState::Loaded);
    assert_eq!(source.package_fetches("slow"), 2);
}
