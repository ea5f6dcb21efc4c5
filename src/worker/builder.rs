//! Builder for configuring worker instances

use std::sync::Arc;

use reqwest::Url;

use super::{Classifier, ServiceWorker};
use crate::cache::{CacheConfig, CacheStorage, MemoryCacheStorage};
use crate::config::{Config, WorkerConfig};
use crate::network::HttpNetwork;
use crate::traits::Network;
use crate::version::CacheNames;
use crate::{MedsourceError, Result};

/// Main entry point for creating worker instances.
pub struct MedSource;

impl MedSource {
    /// Create a new builder for configuring the worker.
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }
}

/// Builder for configuring worker instances.
pub struct WorkerBuilder {
    worker: WorkerConfig,
    cache: CacheConfig,
    storage: Option<Arc<dyn CacheStorage>>,
    network: Option<Arc<dyn Network>>,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            worker: WorkerConfig::default(),
            cache: CacheConfig::default(),
            storage: None,
            network: None,
        }
    }

    /// Start from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            worker: config.worker.clone(),
            cache: config.cache.clone(),
            ..Self::new()
        }
    }

    /// Origin the precache paths resolve against.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.worker.origin = origin.into();
        self
    }

    /// Version tag embedded in the cache names.
    pub fn cache_version(mut self, version: impl Into<String>) -> Self {
        self.worker.cache_version = version.into();
        self
    }

    /// Prefix of the cache names.
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.worker.cache_prefix = prefix.into();
        self
    }

    /// Replace the list of paths precached at install.
    pub fn precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worker.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Activate right after install (default: true).
    pub fn skip_waiting(mut self, skip: bool) -> Self {
        self.worker.skip_waiting = skip;
        self
    }

    /// Path fragment that marks API requests.
    pub fn api_marker(mut self, marker: impl Into<String>) -> Self {
        self.worker.api_marker = marker.into();
        self
    }

    /// Set cache ceilings and the image freshness window.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Use a specific storage backend (default: in-memory).
    pub fn storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use a specific network (default: [`HttpNetwork`]).
    pub fn network(mut self, network: Arc<dyn Network>) -> Self {
        self.network = Some(network);
        self
    }

    /// Build the worker. It starts in [`super::LifecycleState::Parsed`];
    /// call [`ServiceWorker::start`] to install it.
    pub fn build(self) -> Result<ServiceWorker> {
        let origin = Url::parse(&self.worker.origin).map_err(|e| {
            MedsourceError::Configuration(format!("invalid origin {:?}: {e}", self.worker.origin))
        })?;

        if self.worker.cache_version.is_empty() {
            return Err(MedsourceError::Configuration(
                "cache_version must not be empty".into(),
            ));
        }

        let network = match self.network {
            Some(network) => network,
            None => Arc::new(HttpNetwork::new()?),
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryCacheStorage::new()));

        let names = CacheNames::new(&self.worker.cache_prefix, &self.worker.cache_version);

        Ok(ServiceWorker::new(
            storage,
            network,
            names,
            self.cache,
            Classifier::new(self.worker.api_marker),
            origin,
            self.worker.precache,
            self.worker.skip_waiting,
        ))
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
