//! Caching subsystem.
//!
//! - [`CacheStorage`]: named, insertion-ordered caches keyed on request
//!   URL. [`MemoryCacheStorage`] is the in-process implementation; other
//!   backends plug in through the trait.
//!
//! - [`eviction`]: item-count ceiling enforced after each write, oldest
//!   insertion first.
//!
//! - [`CacheConfig`]: ceilings and the image freshness window.

pub mod eviction;
pub mod storage;

pub use eviction::trim_to_ceiling;
pub use storage::{CacheStorage, MemoryCacheStorage};

use std::time::Duration;

use serde::Deserialize;

/// Default ceiling for the image cache.
pub const DEFAULT_IMAGE_MAX_ENTRIES: usize = 200;

/// Default ceiling for the API cache.
pub const DEFAULT_API_MAX_ENTRIES: usize = 50;

/// Default freshness window for cached images: 7 days.
pub const DEFAULT_IMAGE_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 3600);

/// Cache limits.
///
/// ```rust
/// # use medsource::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .image_max_entries(100)
///     .image_max_age(Duration::from_secs(3600));
/// assert_eq!(config.api_max_entries, 50);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries in the image cache. Default: 200.
    pub image_max_entries: usize,
    /// Maximum entries in the API cache. Default: 50.
    pub api_max_entries: usize,
    /// How long a cached image is served without revalidation. Default: 7 days.
    #[serde(rename = "image_max_age_secs", deserialize_with = "duration_secs::deserialize")]
    pub image_max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image_max_entries: DEFAULT_IMAGE_MAX_ENTRIES,
            api_max_entries: DEFAULT_API_MAX_ENTRIES,
            image_max_age: DEFAULT_IMAGE_MAX_AGE,
        }
    }
}

impl CacheConfig {
    /// Create a config with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image cache ceiling.
    pub fn image_max_entries(mut self, n: usize) -> Self {
        self.image_max_entries = n;
        self
    }

    /// Set the API cache ceiling.
    pub fn api_max_entries(mut self, n: usize) -> Self {
        self.api_max_entries = n;
        self
    }

    /// Set the image freshness window.
    pub fn image_max_age(mut self, max_age: Duration) -> Self {
        self.image_max_age = max_age;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
