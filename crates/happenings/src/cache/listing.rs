//! In-memory cache of the default listing, with LRU eviction and TTL.
//!
//! Only the default upcoming view is cached, once per output kind and
//! callback. Every write bumps a generation counter and clears the store, so
//! a body rendered from data read before the write is never stored after it.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::RwLock;

use happenings_core::render::OutputKind;

use crate::render::RenderedBody;

/// Identifies one cached rendering of the default listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub kind: OutputKind,
    pub callback: Option<String>,
}

impl ListingKey {
    pub fn new(kind: OutputKind, callback: Option<&str>) -> Self {
        Self {
            kind,
            callback: callback.map(str::to_string),
        }
    }
}

/// A single cache entry with its expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    body: RenderedBody,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(body: RenderedBody, ttl: Duration) -> Self {
        Self {
            body,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

#[derive(Debug)]
struct Inner {
    store: LruCache<ListingKey, CacheEntry>,
    generation: u64,
}

/// Thread-safe listing cache using `Arc<RwLock<LruCache>>`.
///
/// Expired entries are dropped lazily on access.
#[derive(Debug, Clone)]
pub struct ListingCache {
    inner: Arc<RwLock<Inner>>,
    ttl: Duration,
}

impl ListingCache {
    /// Creates a cache holding at most `max_entries` renderings (at least one).
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                store: LruCache::new(capacity),
                generation: 0,
            })),
            ttl,
        }
    }

    /// Returns a fresh cached body for `key`.
    pub async fn get(&self, key: &ListingKey) -> Option<RenderedBody> {
        let mut inner = self.inner.write().await;

        let expired = match inner.store.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.body.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.store.pop(key);
        }
        None
    }

    /// The current generation; read it before loading the data to render.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Stores `body` unless the cache was invalidated since `generation`.
    ///
    /// Returns true if the body was stored.
    pub async fn put(&self, key: ListingKey, body: RenderedBody, generation: u64) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return false;
        }
        inner.store.put(key, CacheEntry::new(body, self.ttl));
        true
    }

    /// Drops every cached body.
    pub async fn invalidate(&self) {
        let mut inner = self.inner.write().await;
        inner.store.clear();
        inner.generation += 1;
        tracing::debug!(generation = inner.generation, "Listing cache invalidated");
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> RenderedBody {
        RenderedBody::new(OutputKind::Html.content_type(), text)
    }

    fn html_key() -> ListingKey {
        ListingKey::new(OutputKind::Html, None)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = ListingCache::new(4, Duration::from_secs(60));
        let generation = cache.generation().await;

        assert!(cache.put(html_key(), body("<ul></ul>"), generation).await);

        let cached = cache.get(&html_key()).await.unwrap();
        assert_eq!(cached.body, "<ul></ul>");
        assert!(cache
            .get(&ListingKey::new(OutputKind::Json, None))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_callback_is_part_of_the_key() {
        let cache = ListingCache::new(4, Duration::from_secs(60));
        let json = |cb| ListingKey::new(OutputKind::Json, cb);

        cache.put(json(Some("a")), body("a([])"), 0).await;

        assert!(cache.get(&json(Some("a"))).await.is_some());
        assert!(cache.get(&json(Some("b"))).await.is_none());
        assert!(cache.get(&json(None)).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = ListingCache::new(4, Duration::ZERO);
        cache.put(html_key(), body("old"), 0).await;

        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cache.get(&html_key()).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_clears_and_rejects_stale_puts() {
        let cache = ListingCache::new(4, Duration::from_secs(60));
        let before = cache.generation().await;
        cache.put(html_key(), body("v1"), before).await;

        cache.invalidate().await;

        assert!(cache.get(&html_key()).await.is_none());
        assert!(!cache.put(html_key(), body("stale"), before).await);
        assert!(cache.get(&html_key()).await.is_none());

        let after = cache.generation().await;
        assert!(cache.put(html_key(), body("v2"), after).await);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = ListingCache::new(1, Duration::from_secs(60));
        cache.put(html_key(), body("html"), 0).await;
        cache
            .put(ListingKey::new(OutputKind::Ics, None), body("ics"), 0)
            .await;

        assert!(cache.get(&html_key()).await.is_none());
        assert_eq!(cache.len().await, 1);
    }
}
