//! Control channel between the host and the worker.
//!
//! The host posts [`ControlMessage`]s through a [`ControlHandle`]; a task
//! spawned by [`spawn`] processes them one at a time, in order. A message
//! may carry a [`MessagePort`] on which the worker posts its reply.
//!
//! Messages have a JSON wire form matching what the web app posts:
//!
//! ```text
//! {"type":"SKIP_WAITING"}
//! {"type":"CLEAR_CACHE"}
//! {"type":"GET_CACHE_SIZE"}   → {"type":"CACHE_SIZE","stats":[{"cacheName":"...","itemCount":3}]}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ServiceWorker;
use super::strategy::storage_error;
use crate::{MedsourceError, Result};

/// Queue depth of the control channel.
const CONTROL_QUEUE_DEPTH: usize = 32;

/// Commands the host can post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate a waiting worker now.
    SkipWaiting,
    /// Delete every cache store.
    ClearCache,
    /// Reply with per-cache entry counts.
    GetCacheSize,
}

/// Replies posted back on a [`MessagePort`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlReply {
    CacheSize { stats: Vec<CacheStat> },
}

/// Entry count of one cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStat {
    pub cache_name: String,
    pub item_count: usize,
}

/// Reply channel handed over with a message.
pub type MessagePort = oneshot::Sender<ControlReply>;

struct Posted {
    message: ControlMessage,
    port: Option<MessagePort>,
}

/// Host-side handle to a running control loop. Cheap to clone.
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<Posted>,
}

impl ControlHandle {
    /// Post a message, optionally with a reply port.
    ///
    /// Returns once the message is queued, not once it is processed.
    pub async fn post(&self, message: ControlMessage, port: Option<MessagePort>) -> Result<()> {
        self.tx
            .send(Posted { message, port })
            .await
            .map_err(|_| MedsourceError::ControlChannelClosed)
    }

    /// Parse a JSON message (`{"type": "..."}`) and post it.
    pub async fn post_json(&self, json: &str, port: Option<MessagePort>) -> Result<()> {
        let message: ControlMessage = serde_json::from_str(json)?;
        self.post(message, port).await
    }

    /// Post `SKIP_WAITING`.
    pub async fn skip_waiting(&self) -> Result<()> {
        self.post(ControlMessage::SkipWaiting, None).await
    }

    /// Post `CLEAR_CACHE`.
    pub async fn clear_cache(&self) -> Result<()> {
        self.post(ControlMessage::ClearCache, None).await
    }

    /// Post `GET_CACHE_SIZE` and wait for the reply.
    ///
    /// Messages are processed in order, so the stats reflect every message
    /// posted before this one.
    pub async fn cache_size(&self) -> Result<Vec<CacheStat>> {
        let (port, reply) = oneshot::channel();
        self.post(ControlMessage::GetCacheSize, Some(port)).await?;
        match reply.await.map_err(|_| MedsourceError::ControlChannelClosed)? {
            ControlReply::CacheSize { stats } => Ok(stats),
        }
    }
}

/// Start the control loop for `worker`.
///
/// The loop ends when every [`ControlHandle`] has been dropped.
pub fn spawn(worker: Arc<ServiceWorker>) -> (ControlHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Posted>(CONTROL_QUEUE_DEPTH);
    let task = tokio::spawn(async move {
        while let Some(Posted { message, port }) = rx.recv().await {
            worker.handle_message(message, port).await;
        }
        debug!("control channel closed");
    });
    (ControlHandle { tx }, task)
}

impl ServiceWorker {
    /// Process one control message. Failures are logged, never returned.
    pub async fn handle_message(&self, message: ControlMessage, port: Option<MessagePort>) {
        debug!(?message, "control message");
        match message {
            ControlMessage::SkipWaiting => {
                if let Err(e) = self.skip_waiting().await {
                    warn!(error = %e, "skip_waiting failed");
                }
            }
            ControlMessage::ClearCache => {
                let cleared = self.clear_caches().await;
                info!(cleared, "cleared caches");
            }
            ControlMessage::GetCacheSize => {
                let Some(port) = port else {
                    warn!("GET_CACHE_SIZE posted without a reply port");
                    return;
                };
                let stats = self.cache_stats().await;
                if port.send(ControlReply::CacheSize { stats }).is_err() {
                    debug!("cache size requester went away");
                }
            }
        }
    }

    /// Delete every cache store, whatever its version. Returns how many
    /// were deleted.
    pub async fn clear_caches(&self) -> usize {
        let names = match self.storage.cache_names().await {
            Ok(names) => names,
            Err(e) => {
                storage_error("list");
                warn!(error = %e, "could not list caches to clear");
                return 0;
            }
        };

        let mut cleared = 0;
        for name in names {
            match self.storage.delete_cache(&name).await {
                Ok(true) => cleared += 1,
                Ok(false) => {}
                Err(e) => {
                    storage_error("delete_cache");
                    warn!(cache = %name, error = %e, "failed to clear cache");
                }
            }
        }
        cleared
    }

    /// Entry counts for every open cache store, in creation order.
    pub async fn cache_stats(&self) -> Vec<CacheStat> {
        let names = match self.storage.cache_names().await {
            Ok(names) => names,
            Err(e) => {
                storage_error("list");
                warn!(error = %e, "could not list caches for stats");
                return Vec::new();
            }
        };

        let mut stats = Vec::with_capacity(names.len());
        for name in names {
            match self.storage.keys(&name).await {
                Ok(keys) => stats.push(CacheStat {
                    cache_name: name,
                    item_count: keys.len(),
                }),
                Err(e) => {
                    storage_error("list");
                    warn!(cache = %name, error = %e, "could not count cache entries");
                }
            }
        }
        stats
    }
}
