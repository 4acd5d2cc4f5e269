//! Shared cache-or-fetch routine every provider client is built on.

use std::sync::Arc;

use crate::model::CacheTtl;
use crate::ports::{AcquisitionError, CacheStore, Fetcher};

/// Cache-aware retrieval of resolved URLs.
///
/// One instance per provider client: check the cache, fetch on a miss, store
/// the fresh payload, return it. The check-then-fetch-then-store sequence is
/// deliberately unlocked; racing callers may both fetch and the last write
/// wins, which is harmless for idempotent observation snapshots.
pub struct Retriever {
    fetcher: Arc<dyn Fetcher>,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
}

impl Retriever {
    /// Bind a fetcher, an optional cache store, and a freshness window.
    ///
    /// A zero TTL drops the cache entirely: it is never consulted and never
    /// written, regardless of the store's own logic.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
    ) -> Self {
        let cache = if ttl.is_off() { None } else { cache };

        Self { fetcher, cache, ttl }
    }

    /// Return the payload behind `url`, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Propagates the transport's classified [`AcquisitionError`] on a miss
    /// that fails to fetch.
    pub async fn retrieve(&self, url: &str) -> Result<String, AcquisitionError> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.fresh(url, self.ttl).await
        {
            tracing::debug!(url, "serving payload from cache");
            return Ok(hit);
        }

        let payload = self.fetcher.fetch(url).await?;

        if let Some(cache) = &self.cache
            && !cache.store(url, &payload).await
        {
            tracing::debug!(url, "cache store rejected the payload");
        }

        Ok(payload)
    }

    /// Retrieve `url` and decode the payload as a generic JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Decode`] when the payload is not valid
    /// JSON, in addition to the transport errors of [`Self::retrieve`].
    pub async fn retrieve_json(&self, url: &str) -> Result<serde_json::Value, AcquisitionError> {
        let body = self.retrieve(url).await?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::MemoryCache;

    struct CountingFetcher {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::from(self.body))
        }
    }

    const URL: &str = "https://example.test/v1/data";

    #[tokio::test]
    async fn zero_ttl_bypasses_the_cache_entirely() {
        let fetcher = CountingFetcher::new("{\"n\":1}");
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        let retriever = Retriever::new(Arc::clone(&fetcher) as Arc<dyn Fetcher>, Some(cache), CacheTtl::OFF);

        retriever.retrieve(URL).await.expect("first call must succeed");
        retriever.retrieve(URL).await.expect("second call must succeed");

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn fresh_hits_are_served_without_a_second_fetch() {
        let fetcher = CountingFetcher::new("{\"n\":1}");
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        let retriever =
            Retriever::new(Arc::clone(&fetcher) as Arc<dyn Fetcher>, Some(cache), CacheTtl::from_secs(600));

        let first = retriever.retrieve(URL).await.expect("first call must succeed");
        let second = retriever.retrieve(URL).await.expect("second call must succeed");

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn distinct_urls_do_not_share_entries() {
        let fetcher = CountingFetcher::new("{\"n\":1}");
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        let retriever =
            Retriever::new(Arc::clone(&fetcher) as Arc<dyn Fetcher>, Some(cache), CacheTtl::from_secs(600));

        retriever.retrieve(URL).await.expect("first call must succeed");
        retriever
            .retrieve("https://example.test/v1/other")
            .await
            .expect("second call must succeed");

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn invalid_json_surfaces_as_a_decode_error() {
        let fetcher = CountingFetcher::new("<html>maintenance</html>");
        let retriever = Retriever::new(fetcher, None, CacheTtl::OFF);

        let err = retriever.retrieve_json(URL).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Decode(_)));
    }
}
