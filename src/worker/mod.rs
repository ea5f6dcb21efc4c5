//! The fetch interceptor.
//!
//! [`ServiceWorker`] sits between the host application and the
//! [`Network`]. Once activated it classifies every request (see
//! [`classify`]) and answers it with one of the caching strategies; before
//! that it passes everything through untouched.
//!
//! # Lifecycle
//!
//! ```text
//! Parsed ──install──▶ Installing ──▶ Installed ──activate──▶ Activating ──▶ Activated
//!                         │
//!                         └── precache failed ──▶ Redundant
//! ```
//!
//! Dropping an `install` or `activate` future midway puts the worker back
//! where the step started, so it can be retried.
//!
//! With `skip_waiting` (the default), [`ServiceWorker::start`] activates
//! right after install. Otherwise the worker waits in `Installed` until the
//! host activates it directly or posts `SKIP_WAITING` on the control
//! channel ([`control`]).
//!
//! # Concurrency
//!
//! The worker is `Send + Sync` and meant to be shared behind an `Arc`.
//! Concurrent fetches run independently; cache writes and their eviction
//! passes may interleave, so a cache can briefly exceed its ceiling.

mod builder;
pub mod classify;
pub mod control;
mod lifecycle;
mod strategy;

pub use builder::{MedSource, WorkerBuilder};
pub use classify::{Classifier, RequestClass};
pub use control::{CacheStat, ControlHandle, ControlMessage, ControlReply, MessagePort};

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::watch;
use tracing::instrument;

use crate::Result;
use crate::cache::{CacheConfig, CacheStorage};
use crate::telemetry;
use crate::traits::Network;
use crate::types::{Request, Response};
use crate::version::CacheNames;

/// Lifecycle state of a [`ServiceWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Parsed,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    /// Controls clients; requests are intercepted.
    Activated,
    /// Install failed; this worker will never activate.
    Redundant,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        }
    }
}

/// Caching fetch interceptor.
///
/// Build one with [`MedSource::builder()`].
pub struct ServiceWorker {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    names: CacheNames,
    limits: CacheConfig,
    classifier: Classifier,
    origin: Url,
    precache: Vec<String>,
    skip_waiting: bool,
    state: watch::Sender<LifecycleState>,
}

impl ServiceWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        names: CacheNames,
        limits: CacheConfig,
        classifier: Classifier,
        origin: Url,
        precache: Vec<String>,
        skip_waiting: bool,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::Parsed);
        Self {
            storage,
            network,
            names,
            limits,
            classifier,
            origin,
            precache,
            skip_waiting,
            state,
        }
    }

    /// The version-tagged names of this worker's caches.
    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    /// The storage this worker reads and writes.
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Whether requests are currently being intercepted.
    pub fn controls_clients(&self) -> bool {
        self.state() == LifecycleState::Activated
    }

    /// Classify a request without handling it.
    pub fn classify(&self, request: &Request) -> RequestClass {
        self.classifier.classify(request)
    }

    /// Handle one outgoing request.
    ///
    /// Image, API and static requests always resolve to a response: network
    /// failures are answered from cache or synthetically. Network-only and
    /// passthrough requests surface network errors as `Err`, exactly as an
    /// uncontrolled fetch would.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response> {
        let class = if self.controls_clients() {
            self.classifier.classify(request)
        } else {
            RequestClass::Passthrough
        };

        let response = match class {
            RequestClass::NetworkOnly => self.network_only(request).await?,
            RequestClass::Image => self.image_strategy(request).await,
            RequestClass::Api => self.api_strategy(request).await,
            RequestClass::Static => self.static_strategy(request).await,
            RequestClass::Passthrough => self.network.fetch(request).await?,
        };

        metrics::counter!(telemetry::FETCH_TOTAL,
            "strategy" => class.as_str(),
            "source" => response.source.as_str(),
        )
        .increment(1);
        Ok(response)
    }
}
