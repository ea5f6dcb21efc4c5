//! Telemetry metric name constants.
//!
//! Centralised metric names for the fetch interceptor. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `medsource_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `strategy`: request class: "image", "api", "static", "network_only", "passthrough"
//! - `source`: where the response came from: "network", "cache", "cache_fallback", "synthetic"
//! - `cache`: cache kind: "images", "api", "static"

/// Total requests handled by the interceptor.
///
/// Labels: `strategy`, `source`.
pub const FETCH_TOTAL: &str = "medsource_fetch_total";

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "medsource_cache_hits_total";

/// Total cache misses (stale images that forced a refetch count as misses).
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "medsource_cache_misses_total";

/// Total entries removed by the item-count ceiling.
///
/// Labels: `cache`.
pub const CACHE_EVICTIONS_TOTAL: &str = "medsource_cache_evictions_total";

/// Total network failures that were answered from cache or synthetically.
///
/// Labels: `strategy`.
pub const NETWORK_FALLBACKS_TOTAL: &str = "medsource_network_fallbacks_total";

/// Total cache storage operations that failed and were skipped.
///
/// Labels: `operation` ("lookup", "put", "evict", "precache", "list", "delete_cache").
pub const STORAGE_ERRORS_TOTAL: &str = "medsource_storage_errors_total";
