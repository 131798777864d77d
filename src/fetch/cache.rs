use super::ImageFetcher;
use crate::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const DEFAULT_CAPACITY: usize = 256;

/// Wraps a fetcher with an in-memory LRU cache of fetched bytes keyed by URL.
///
/// Failures are not cached, so a later batch retries them.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    cache: Arc<Mutex<LruCache<String, Arc<Vec<u8>>>>>,
}

impl<F: ImageFetcher> CachedFetcher<F> {
    /// Create a new cache in front of `inner` with the given capacity
    pub fn new(inner: F, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Create a new cache with default capacity (256 entries)
    pub fn with_default_capacity(inner: F) -> Self {
        Self::new(inner, DEFAULT_CAPACITY)
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Check if bytes for `url` are cached
    pub fn contains(&self, url: &str) -> bool {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.contains(url))
            .unwrap_or(false)
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.cache.lock().ok().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.get(url).cloned()
    }
}

#[async_trait]
impl<F: ImageFetcher> ImageFetcher for CachedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.cached(url) {
            log::debug!("icon cache hit for {}", url);
            return Ok(bytes.as_ref().clone());
        }

        let bytes = self.inner.fetch(url).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(url.to_string(), Arc::new(bytes.clone()));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("broken") {
                return Err(MapError::Fetch {
                    url: url.to_string(),
                    reason: "HTTP 404".to_string(),
                });
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_repeated_fetch_hits_cache() {
        let fetcher = CachedFetcher::new(CountingFetcher::default(), 4);

        let first = fetcher.fetch("https://x/a.png").await.unwrap();
        let second = fetcher.fetch("https://x/a.png").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.inner().calls.load(Ordering::SeqCst), 1);
        assert!(fetcher.contains("https://x/a.png"));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let fetcher = CachedFetcher::new(CountingFetcher::default(), 4);

        assert!(fetcher.fetch("https://x/broken.png").await.is_err());
        assert!(fetcher.fetch("https://x/broken.png").await.is_err());

        assert_eq!(fetcher.inner().calls.load(Ordering::SeqCst), 2);
        assert!(fetcher.is_empty());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let fetcher = CachedFetcher::new(CountingFetcher::default(), 2);

        fetcher.fetch("a").await.unwrap();
        fetcher.fetch("b").await.unwrap();
        fetcher.fetch("c").await.unwrap();

        assert_eq!(fetcher.len(), 2);
        assert!(!fetcher.contains("a"));
        assert!(fetcher.contains("b"));
        assert!(fetcher.contains("c"));

        fetcher.clear();
        assert!(fetcher.is_empty());
    }
}
