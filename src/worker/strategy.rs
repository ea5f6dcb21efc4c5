//! Per-class request handlers.
//!
//! Storage failures never fail a request: they are logged, counted and
//! the handler carries on as if the cache were empty or the write had been
//! skipped.

use chrono::Utc;
use tracing::{debug, warn};

use super::ServiceWorker;
use crate::cache::trim_to_ceiling;
use crate::telemetry;
use crate::types::{CacheMode, Request, Response, ResponseSource};
use crate::version::CacheKind;
use crate::Result;

impl ServiceWorker {
    /// JavaScript bundles: always from the network, never cached.
    pub(super) async fn network_only(&self, request: &Request) -> Result<Response> {
        let request = request.clone().cache_mode(CacheMode::NoStore);
        self.network.fetch(&request).await
    }

    /// Cache-first with a freshness window; any cached copy beats a broken image.
    pub(super) async fn image_strategy(&self, request: &Request) -> Response {
        let key = request.cache_key();
        let cached = self.cached(CacheKind::Images, &key).await;

        if let Some(hit) = &cached
            && hit.is_fresh(self.limits.image_max_age, Utc::now())
        {
            record_hit(CacheKind::Images);
            return hit.clone().with_source(ResponseSource::Cache);
        }
        record_miss(CacheKind::Images);

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(
                        CacheKind::Images,
                        &key,
                        &response,
                        Some(self.limits.image_max_entries),
                    )
                    .await;
                }
                response
            }
            Err(e) => {
                record_fallback("image");
                match cached {
                    Some(stale) => {
                        debug!(url = %request.url, error = %e, "network failed, serving cached image");
                        stale.with_source(ResponseSource::CacheFallback)
                    }
                    None => {
                        warn!(url = %request.url, error = %e, "network failed, no cached image");
                        Response::not_found()
                    }
                }
            }
        }
    }

    /// Network-first; the cache only answers when the network cannot.
    pub(super) async fn api_strategy(&self, request: &Request) -> Response {
        let key = request.cache_key();

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(
                        CacheKind::Api,
                        &key,
                        &response,
                        Some(self.limits.api_max_entries),
                    )
                    .await;
                }
                response
            }
            Err(e) => {
                record_fallback("api");
                match self.cached(CacheKind::Api, &key).await {
                    Some(hit) => {
                        record_hit(CacheKind::Api);
                        debug!(url = %request.url, error = %e, "network failed, serving cached API response");
                        hit.with_source(ResponseSource::CacheFallback)
                    }
                    None => {
                        record_miss(CacheKind::Api);
                        warn!(url = %request.url, error = %e, "network failed, no cached API response");
                        Response::offline()
                    }
                }
            }
        }
    }

    /// Cache-first without expiry; entries live until the cache version changes.
    pub(super) async fn static_strategy(&self, request: &Request) -> Response {
        let key = request.cache_key();

        if let Some(hit) = self.cached(CacheKind::Static, &key).await {
            record_hit(CacheKind::Static);
            return hit.with_source(ResponseSource::Cache);
        }
        record_miss(CacheKind::Static);

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(CacheKind::Static, &key, &response, None).await;
                }
                response
            }
            Err(e) => {
                record_fallback("static");
                warn!(url = %request.url, error = %e, "network failed, static asset not cached");
                Response::offline()
            }
        }
    }

    /// Look up `key`, treating storage errors as a miss.
    async fn cached(&self, kind: CacheKind, key: &str) -> Option<Response> {
        let cache = self.names.get(kind);
        match self.storage.lookup(cache, key).await {
            Ok(hit) => hit,
            Err(e) => {
                storage_error("lookup");
                warn!(cache, error = %e, "cache lookup failed");
                None
            }
        }
    }

    /// Store a copy of `response` and enforce `ceiling`, logging failures.
    async fn store(&self, kind: CacheKind, key: &str, response: &Response, ceiling: Option<usize>) {
        let cache = self.names.get(kind);
        if let Err(e) = self.storage.put(cache, key, response.clone()).await {
            storage_error("put");
            warn!(cache, error = %e, "cache write failed");
            return;
        }

        let Some(ceiling) = ceiling else {
            return;
        };
        match trim_to_ceiling(self.storage.as_ref(), cache, ceiling).await {
            Ok(0) => {}
            Ok(evicted) => {
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "cache" => kind.as_str())
                    .increment(evicted as u64);
            }
            Err(e) => {
                storage_error("evict");
                warn!(cache, error = %e, "cache eviction failed");
            }
        }
    }
}

fn record_hit(kind: CacheKind) {
    metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => kind.as_str()).increment(1);
}

fn record_miss(kind: CacheKind) {
    metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => kind.as_str()).increment(1);
}

fn record_fallback(strategy: &'static str) {
    metrics::counter!(telemetry::NETWORK_FALLBACKS_TOTAL, "strategy" => strategy).increment(1);
}

pub(super) fn storage_error(operation: &'static str) {
    metrics::counter!(telemetry::STORAGE_ERRORS_TOTAL, "operation" => operation).increment(1);
}
