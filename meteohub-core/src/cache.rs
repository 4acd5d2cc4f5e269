//! Bundled in-memory implementation of the cache store port.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::model::CacheTtl;
use crate::ports::CacheStore;

#[derive(Debug)]
struct StoredEntry {
    payload: String,
    stored_at: Instant,
}

/// Mutexed map keyed by resolved URL.
///
/// Entries are overwritten on every successful fetch and never evicted;
/// staleness is decided at read time against the caller's TTL.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        if let Ok(mut entries) = self.entries.lock()
            && let Some(entry) = entries.get_mut(key)
            && let Some(past) = Instant::now().checked_sub(age)
        {
            entry.stored_at = past;
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn fresh(&self, key: &str, ttl: CacheTtl) -> Option<String> {
        if ttl.is_off() {
            return None;
        }

        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;

        let window = Duration::from_secs(ttl.as_secs());
        if entry.stored_at.elapsed() <= window {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    async fn store(&self, key: &str, payload: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(
                    key.to_owned(),
                    StoredEntry {
                        payload: payload.to_owned(),
                        stored_at: Instant::now(),
                    },
                );
                true
            }
            Err(_poisoned) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "https://example.test/data";

    #[tokio::test]
    async fn stored_payload_is_served_while_fresh() {
        let cache = MemoryCache::new();

        assert!(cache.store(KEY, "payload").await);
        assert_eq!(
            cache.fresh(KEY, CacheTtl::from_secs(60)).await.as_deref(),
            Some("payload")
        );
    }

    #[tokio::test]
    async fn stale_entries_are_not_served() {
        let cache = MemoryCache::new();
        cache.store(KEY, "payload").await;
        cache.backdate(KEY, Duration::from_secs(120));

        assert_eq!(cache.fresh(KEY, CacheTtl::from_secs(60)).await, None);
    }

    #[tokio::test]
    async fn overwrite_replaces_the_previous_payload() {
        let cache = MemoryCache::new();
        cache.store(KEY, "first").await;
        cache.store(KEY, "second").await;

        assert_eq!(
            cache.fresh(KEY, CacheTtl::from_secs(60)).await.as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn zero_ttl_never_serves_from_cache() {
        let cache = MemoryCache::new();
        cache.store(KEY, "payload").await;

        assert_eq!(cache.fresh(KEY, CacheTtl::OFF).await, None);
    }
}
