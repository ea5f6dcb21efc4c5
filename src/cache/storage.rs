//! Named cache stores.
//!
//! [`CacheStorage`] is the seam between the interceptor and wherever
//! responses live. It models a set of named caches, each an
//! insertion-ordered map from request URL to response. The interceptor
//! only ever uses the per-key `put`/`delete` primitives; no operation
//! spans more than one call except [`CacheStorage::put_all`].

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::types::Response;

/// Storage backend holding named caches.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the cache if it does not exist yet.
    async fn open(&self, cache: &str) -> Result<()>;

    /// Names of all existing caches, in creation order.
    async fn cache_names(&self) -> Result<Vec<String>>;

    /// Delete a whole cache. Returns whether it existed.
    async fn delete_cache(&self, cache: &str) -> Result<bool>;

    /// Look up a response by key. A missing cache is a miss.
    async fn lookup(&self, cache: &str, key: &str) -> Result<Option<Response>>;

    /// Store a response, creating the cache if needed.
    ///
    /// Storing under an existing key replaces the entry and moves it to
    /// the end of the insertion order.
    async fn put(&self, cache: &str, key: &str, response: Response) -> Result<()>;

    /// Store several responses as one operation: either all are stored or
    /// none are.
    async fn put_all(&self, cache: &str, entries: Vec<(String, Response)>) -> Result<()> {
        for (key, response) in entries {
            self.put(cache, &key, response).await?;
        }
        Ok(())
    }

    /// Keys of a cache in insertion order, oldest first. A missing cache
    /// has no keys.
    async fn keys(&self, cache: &str) -> Result<Vec<String>>;

    /// Delete one entry. Returns whether it existed.
    async fn delete(&self, cache: &str, key: &str) -> Result<bool>;
}

/// One named cache: entries plus their insertion sequence.
#[derive(Default)]
struct NamedCache {
    entries: HashMap<String, (u64, Response)>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl NamedCache {
    fn insert(&mut self, key: &str, response: Response) {
        if let Some((old_seq, _)) = self.entries.remove(key) {
            self.order.remove(&old_seq);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_owned());
        self.entries.insert(key.to_owned(), (seq, response));
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((seq, _)) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        self.order.values().cloned().collect()
    }
}

/// In-memory [`CacheStorage`].
///
/// Thread-safe; every operation takes the lock once, so individual puts
/// and deletes are atomic while sequences of them are not.
#[derive(Default)]
pub struct MemoryCacheStorage {
    // Vec keeps creation order; there are only ever a handful of caches.
    caches: RwLock<Vec<(String, NamedCache)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find<'a>(caches: &'a [(String, NamedCache)], name: &str) -> Option<&'a NamedCache> {
    caches.iter().find(|(n, _)| n == name).map(|(_, c)| c)
}

fn find_or_create<'a>(caches: &'a mut Vec<(String, NamedCache)>, name: &str) -> &'a mut NamedCache {
    let idx = match caches.iter().position(|(n, _)| n == name) {
        Some(idx) => idx,
        None => {
            caches.push((name.to_owned(), NamedCache::default()));
            caches.len() - 1
        }
    };
    &mut caches[idx].1
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, cache: &str) -> Result<()> {
        let mut caches = self.caches.write().await;
        find_or_create(&mut caches, cache);
        Ok(())
    }

    async fn cache_names(&self) -> Result<Vec<String>> {
        let caches = self.caches.read().await;
        Ok(caches.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|(n, _)| n != cache);
        Ok(caches.len() != before)
    }

    async fn lookup(&self, cache: &str, key: &str) -> Result<Option<Response>> {
        let caches = self.caches.read().await;
        Ok(find(&caches, cache)
            .and_then(|c| c.entries.get(key))
            .map(|(_, response)| response.clone()))
    }

    async fn put(&self, cache: &str, key: &str, response: Response) -> Result<()> {
        let mut caches = self.caches.write().await;
        find_or_create(&mut caches, cache).insert(key, response);
        Ok(())
    }

    async fn put_all(&self, cache: &str, entries: Vec<(String, Response)>) -> Result<()> {
        // Single lock acquisition makes the batch atomic for other callers.
        let mut caches = self.caches.write().await;
        let named = find_or_create(&mut caches, cache);
        for (key, response) in entries {
            named.insert(&key, response);
        }
        Ok(())
    }

    async fn keys(&self, cache: &str) -> Result<Vec<String>> {
        let caches = self.caches.read().await;
        Ok(find(&caches, cache).map(NamedCache::keys).unwrap_or_default())
    }

    async fn delete(&self, cache: &str, key: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        Ok(caches
            .iter_mut()
            .find(|(n, _)| n == cache)
            .is_some_and(|(_, c)| c.remove(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keys_follow_insertion_order() {
        let storage = MemoryCacheStorage::new();
        for key in ["a", "b", "c"] {
            storage.put("c1", key, Response::ok(key)).await.unwrap();
        }
        assert_eq!(storage.keys("c1").await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn reput_moves_key_to_end() {
        let storage = MemoryCacheStorage::new();
        for key in ["a", "b", "c"] {
            storage.put("c1", key, Response::ok(key)).await.unwrap();
        }
        storage.put("c1", "a", Response::ok("a2")).await.unwrap();

        assert_eq!(storage.keys("c1").await.unwrap(), vec!["b", "c", "a"]);
        let hit = storage.lookup("c1", "a").await.unwrap().unwrap();
        assert_eq!(hit.text(), "a2");
    }

    #[tokio::test]
    async fn lookup_reads_do_not_reorder() {
        let storage = MemoryCacheStorage::new();
        storage.put("c1", "a", Response::ok("a")).await.unwrap();
        storage.put("c1", "b", Response::ok("b")).await.unwrap();
        storage.lookup("c1", "a").await.unwrap();
        assert_eq!(storage.keys("c1").await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn missing_cache_is_empty_not_error() {
        let storage = MemoryCacheStorage::new();
        assert!(storage.lookup("nope", "a").await.unwrap().is_none());
        assert!(storage.keys("nope").await.unwrap().is_empty());
        assert!(!storage.delete("nope", "a").await.unwrap());
        assert!(!storage.delete_cache("nope").await.unwrap());
    }

    #[tokio::test]
    async fn cache_names_in_creation_order() {
        let storage = MemoryCacheStorage::new();
        storage.open("first").await.unwrap();
        storage.put("second", "k", Response::ok("v")).await.unwrap();
        storage.open("first").await.unwrap();
        assert_eq!(storage.cache_names().await.unwrap(), vec!["first", "second"]);

        assert!(storage.delete_cache("first").await.unwrap());
        assert_eq!(storage.cache_names().await.unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn delete_single_entry() {
        let storage = MemoryCacheStorage::new();
        storage.put("c1", "a", Response::ok("a")).await.unwrap();
        assert!(storage.delete("c1", "a").await.unwrap());
        assert!(!storage.delete("c1", "a").await.unwrap());
        assert!(storage.keys("c1").await.unwrap().is_empty());
    }
}
