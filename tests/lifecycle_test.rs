//! Tests for install/activate: precaching, version cleanup and waiting.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use medsource::worker::control;
use medsource::{
    CacheStorage, LifecycleState, MedSource, MedsourceError, MemoryCacheStorage, Network,
    Request, Response, ResponseSource, Result,
};

// ============================================================================
// Mock network
// ============================================================================

/// 200 (dated now) for every URL except those containing `fail_on`.
struct SiteNetwork {
    calls: AtomicU32,
    fail_on: Option<&'static str>,
}

impl SiteNetwork {
    fn healthy() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_on: None,
        }
    }

    fn failing_on(fragment: &'static str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_on: Some(fragment),
        }
    }
}

#[async_trait]
impl Network for SiteNetwork {
    fn name(&self) -> &str {
        "site"
    }

    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.is_some_and(|f| request.url.as_str().contains(f)) {
            return Ok(Response::new(StatusCode::NOT_FOUND));
        }
        Ok(Response::ok(format!("page {}", request.url.path())).with_date(Utc::now()))
    }
}

/// Sleeps for a long time per request while `slow` is set.
#[derive(Default)]
struct SlowNetwork {
    slow: AtomicBool,
}

#[async_trait]
impl Network for SlowNetwork {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch(&self, request: &Request) -> Result<Response> {
        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(Response::ok(format!("page {}", request.url.path())).with_date(Utc::now()))
    }
}

const ORIGIN: &str = "https://shop.test/";

async fn seed(storage: &MemoryCacheStorage, cache: &str, keys: &[&str]) {
    storage.open(cache).await.unwrap();
    for key in keys {
        storage.put(cache, key, Response::ok("seeded")).await.unwrap();
    }
}

// =========================================================================
// Install
// =========================================================================

#[tokio::test]
async fn install_precaches_critical_paths() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::healthy()))
        .storage(storage.clone())
        .skip_waiting(false)
        .build()
        .unwrap();

    assert_eq!(worker.state(), LifecycleState::Parsed);
    worker.install().await.unwrap();
    assert_eq!(worker.state(), LifecycleState::Installed);

    let keys = storage.keys(&worker.cache_names().statics).await.unwrap();
    let keys: HashSet<_> = keys.into_iter().collect();
    assert_eq!(
        keys,
        HashSet::from([
            "https://shop.test/".to_string(),
            "https://shop.test/manifest.json".to_string(),
        ])
    );
}

#[tokio::test]
async fn failed_precache_stores_nothing() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::failing_on("manifest")))
        .storage(storage.clone())
        .build()
        .unwrap();

    let err = worker.start().await.unwrap_err();
    assert!(matches!(err, MedsourceError::Install(_)), "got {err:?}");
    assert_eq!(worker.state(), LifecycleState::Redundant);
    assert!(storage.cache_names().await.unwrap().is_empty());

    let err = worker.activate().await.unwrap_err();
    assert!(matches!(err, MedsourceError::InvalidState { .. }));
}

#[tokio::test]
async fn install_runs_once() {
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::healthy()))
        .skip_waiting(false)
        .build()
        .unwrap();

    worker.install().await.unwrap();
    let err = worker.install().await.unwrap_err();
    assert!(matches!(
        err,
        MedsourceError::InvalidState {
            action: "install",
            state: "installed"
        }
    ));
}

#[tokio::test]
async fn activate_requires_install() {
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::healthy()))
        .build()
        .unwrap();

    let err = worker.activate().await.unwrap_err();
    assert!(matches!(
        err,
        MedsourceError::InvalidState {
            action: "activate",
            state: "parsed"
        }
    ));
}

// =========================================================================
// Activate
// =========================================================================

#[tokio::test]
async fn activation_deletes_previous_version_caches() {
    let storage = Arc::new(MemoryCacheStorage::new());
    seed(&storage, "medsource-images-v1.0.0", &["https://shop.test/a.png"]).await;
    seed(&storage, "medsource-api-v1.0.0", &["https://shop.test/api/x"]).await;
    seed(&storage, "medsource-static-v1.0.0", &["https://shop.test/"]).await;
    seed(&storage, "medsource-api-v1.1.0", &["https://shop.test/api/y"]).await;
    seed(&storage, "medsource-images-v1.1.0", &["https://shop.test/b.png"]).await;

    let worker = MedSource::builder()
        .origin(ORIGIN)
        .cache_version("v1.1.0")
        .network(Arc::new(SiteNetwork::healthy()))
        .storage(storage.clone())
        .skip_waiting(false)
        .build()
        .unwrap();

    worker.install().await.unwrap();
    let mut deleted = worker.activate().await.unwrap();
    deleted.sort();
    assert_eq!(
        deleted,
        vec![
            "medsource-api-v1.0.0",
            "medsource-images-v1.0.0",
            "medsource-static-v1.0.0",
        ]
    );
    assert_eq!(worker.state(), LifecycleState::Activated);

    let mut remaining = storage.cache_names().await.unwrap();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            "medsource-api-v1.1.0",
            "medsource-images-v1.1.0",
            "medsource-static-v1.1.0",
        ]
    );
    assert_eq!(
        storage.keys("medsource-api-v1.1.0").await.unwrap(),
        vec!["https://shop.test/api/y"]
    );
    assert_eq!(
        storage.keys("medsource-images-v1.1.0").await.unwrap(),
        vec!["https://shop.test/b.png"]
    );
}

#[tokio::test]
async fn activation_removes_foreign_caches_too() {
    let storage = Arc::new(MemoryCacheStorage::new());
    seed(&storage, "workbox-precache", &["https://shop.test/"]).await;

    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::healthy()))
        .storage(storage.clone())
        .build()
        .unwrap();
    worker.start().await.unwrap();

    let names = storage.cache_names().await.unwrap();
    assert!(!names.iter().any(|n| n == "workbox-precache"));
}

#[tokio::test]
async fn precached_manifest_is_served_from_cache() {
    let network = Arc::new(SiteNetwork::healthy());
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(network.clone())
        .build()
        .unwrap();
    worker.start().await.unwrap();
    assert_eq!(network.calls.load(Ordering::SeqCst), 2);

    let manifest = Request::get("https://shop.test/manifest.json").unwrap();
    let response = worker.handle_fetch(&manifest).await.unwrap();
    assert_eq!(response.source, ResponseSource::Cache);
    assert_eq!(network.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelled_install_can_be_retried() {
    let network = Arc::new(SlowNetwork::default());
    network.slow.store(true, Ordering::SeqCst);
    let storage = Arc::new(MemoryCacheStorage::new());
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(network.clone())
        .storage(storage.clone())
        .build()
        .unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), worker.start()).await;
    assert!(timed_out.is_err());
    assert_eq!(worker.state(), LifecycleState::Parsed);
    assert!(storage.cache_names().await.unwrap().is_empty());

    network.slow.store(false, Ordering::SeqCst);
    worker.start().await.unwrap();
    assert_eq!(worker.state(), LifecycleState::Activated);
    assert_eq!(
        storage.keys(&worker.cache_names().statics).await.unwrap().len(),
        2
    );
}

// =========================================================================
// Waiting and SKIP_WAITING
// =========================================================================

#[tokio::test]
async fn waiting_worker_activates_on_skip_waiting_message() {
    let network = Arc::new(SiteNetwork::healthy());
    let worker = Arc::new(
        MedSource::builder()
            .origin(ORIGIN)
            .network(network.clone())
            .skip_waiting(false)
            .build()
            .unwrap(),
    );
    let mut states = worker.subscribe();

    worker.start().await.unwrap();
    assert_eq!(worker.state(), LifecycleState::Installed);
    assert!(!worker.controls_clients());

    // Still waiting: requests pass through.
    let logo = Request::get("https://shop.test/img/logo.png").unwrap();
    worker.handle_fetch(&logo).await.unwrap();
    worker.handle_fetch(&logo).await.unwrap();
    assert_eq!(network.calls.load(Ordering::SeqCst), 4);

    let (handle, _task) = control::spawn(worker.clone());
    handle.skip_waiting().await.unwrap();
    states
        .wait_for(|state| *state == LifecycleState::Activated)
        .await
        .unwrap();

    worker.handle_fetch(&logo).await.unwrap();
    let cached = worker.handle_fetch(&logo).await.unwrap();
    assert_eq!(cached.source, ResponseSource::Cache);
    assert_eq!(network.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn skip_waiting_is_ignored_once_active() {
    let worker = MedSource::builder()
        .origin(ORIGIN)
        .network(Arc::new(SiteNetwork::healthy()))
        .build()
        .unwrap();
    worker.start().await.unwrap();

    worker.skip_waiting().await.unwrap();
    assert_eq!(worker.state(), LifecycleState::Activated);
}
