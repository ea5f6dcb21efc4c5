//! Tests for the control channel: SKIP_WAITING, CLEAR_CACHE, GET_CACHE_SIZE.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use medsource::worker::control;
use medsource::{
    ControlMessage, ControlReply, MedSource, MedsourceError, Network, Request, Response, Result,
    ServiceWorker,
};

struct EchoNetwork;

#[async_trait]
impl Network for EchoNetwork {
    fn name(&self) -> &str {
        "echo"
    }

    async fn fetch(&self, request: &Request) -> Result<Response> {
        Ok(Response::ok(request.url.to_string()).with_date(Utc::now()))
    }
}

async fn active_worker() -> Arc<ServiceWorker> {
    let worker = MedSource::builder()
        .origin("https://shop.test/")
        .cache_version("v1.1.0")
        .network(Arc::new(EchoNetwork))
        .build()
        .unwrap();
    worker.start().await.unwrap();
    Arc::new(worker)
}

async fn fetch_all(worker: &ServiceWorker, urls: &[&str]) {
    for url in urls {
        worker
            .handle_fetch(&Request::get(url).unwrap())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn cache_size_counts_every_open_store() {
    let worker = active_worker().await;
    fetch_all(
        &worker,
        &[
            "https://shop.test/api/products",
            "https://shop.test/api/orders",
            "https://shop.test/img/a.png",
        ],
    )
    .await;

    let (handle, _task) = control::spawn(worker.clone());
    let stats = handle.cache_size().await.unwrap();

    let counts: HashMap<_, _> = stats
        .into_iter()
        .map(|s| (s.cache_name, s.item_count))
        .collect();
    assert_eq!(counts.len(), 3);
    assert_eq!(counts["medsource-static-v1.1.0"], 2);
    assert_eq!(counts["medsource-api-v1.1.0"], 2);
    assert_eq!(counts["medsource-images-v1.1.0"], 1);
}

#[tokio::test]
async fn clear_cache_deletes_every_store() {
    let worker = active_worker().await;
    fetch_all(&worker, &["https://shop.test/api/products"]).await;

    let (handle, _task) = control::spawn(worker.clone());
    handle.clear_cache().await.unwrap();

    // Processed in order: the reply reflects the clear.
    let stats = handle.cache_size().await.unwrap();
    assert!(stats.is_empty(), "got {stats:?}");
    assert!(worker.storage().cache_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn json_messages_reply_in_wire_form() {
    let worker = active_worker().await;
    let (handle, _task) = control::spawn(worker);

    let (port, reply) = oneshot::channel();
    handle
        .post_json(r#"{"type":"GET_CACHE_SIZE"}"#, Some(port))
        .await
        .unwrap();
    let reply = reply.await.unwrap();

    let ControlReply::CacheSize { stats } = &reply;
    assert_eq!(stats.len(), 1);

    let wire = serde_json::to_value(&reply).unwrap();
    assert_eq!(wire["type"], "CACHE_SIZE");
    assert_eq!(wire["stats"][0]["cacheName"], "medsource-static-v1.1.0");
    assert_eq!(wire["stats"][0]["itemCount"], 2);
}

#[tokio::test]
async fn malformed_json_is_rejected_before_posting() {
    let worker = active_worker().await;
    let (handle, _task) = control::spawn(worker);

    let err = handle.post_json(r#"{"kind":"CLEAR_CACHE"}"#, None).await;
    assert!(matches!(err, Err(MedsourceError::Json(_))));
}

#[tokio::test]
async fn cache_size_without_port_is_ignored() {
    let worker = active_worker().await;
    let (handle, _task) = control::spawn(worker);

    handle
        .post(ControlMessage::GetCacheSize, None)
        .await
        .unwrap();
    // The loop is still alive.
    assert_eq!(handle.cache_size().await.unwrap().len(), 1);
}

#[tokio::test]
async fn loop_ends_when_handles_are_dropped() {
    let worker = active_worker().await;
    let (handle, task) = control::spawn(worker);
    let other = handle.clone();

    drop(handle);
    other.clear_cache().await.unwrap();
    drop(other);

    task.await.unwrap();
}
