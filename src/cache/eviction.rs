//! Item-count eviction.
//!
//! This is FIFO, not LRU: "oldest" means first inserted, as reported by
//! [`CacheStorage::keys`]. Reads never refresh an entry's position and
//! response size is not considered.

use tracing::debug;

use super::storage::CacheStorage;
use crate::Result;

/// Delete the oldest entries of `cache` until at most `ceiling` remain.
///
/// Returns how many entries were deleted. Not atomic with respect to
/// concurrent puts: a racing insert can leave the cache briefly above its
/// ceiling until the next trim.
pub async fn trim_to_ceiling(
    storage: &dyn CacheStorage,
    cache: &str,
    ceiling: usize,
) -> Result<usize> {
    let keys = storage.keys(cache).await?;
    if keys.len() <= ceiling {
        return Ok(0);
    }

    let excess = keys.len() - ceiling;
    let mut evicted = 0;
    for key in keys.iter().take(excess) {
        if storage.delete(cache, key).await? {
            evicted += 1;
        }
    }
    debug!(cache, evicted, ceiling, "trimmed cache");
    Ok(evicted)
}
