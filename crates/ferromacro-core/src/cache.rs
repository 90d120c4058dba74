//! In-memory cache for loaded tables.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{DateWindow, SeriesFrame};

/// How a load interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Serve a live entry if present; otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch, then store the fresh result.
    Refresh,
    /// Always fetch; neither read nor write the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

#[derive(Debug)]
struct CacheInner<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> CacheInner<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn put(&mut self, key: K, value: V) {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.is_live(now));
    }
}

/// Thread-safe map whose entries expire after a fixed time-to-live.
///
/// A TTL of zero disables the cache: `put` is a no-op.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<K, V>>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.read().await.get(key)
    }

    pub async fn put(&self, key: K, value: V) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() {
            return;
        }
        store.put(key, value);
    }

    pub async fn clear_expired(&self) {
        self.inner.write().await.clear_expired();
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }
}

/// Loaded tables keyed by the window they cover.
pub type FrameCache = TtlCache<DateWindow, Arc<SeriesFrame>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> DateWindow {
        DateWindow::parse(start, end).expect("valid window")
    }

    #[tokio::test]
    async fn stores_and_returns_by_window() {
        let cache = FrameCache::new(Duration::from_secs(60));
        let key = window("2020-01-01", "2024-01-01");

        assert!(cache.get(&key).await.is_none());
        cache.put(key, Arc::new(SeriesFrame::default())).await;
        assert!(cache.get(&key).await.is_some());

        let other = window("2020-01-01", "2024-01-02");
        assert!(cache.get(&other).await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = TtlCache::<&'static str, u32>::new(Duration::from_millis(50));
        cache.put("key", 1).await;
        assert_eq!(cache.get(&"key").await, Some(1));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get(&"key").await, None);
        assert_eq!(cache.len().await, 1);

        cache.clear_expired().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn huge_ttl_never_expires() {
        let cache = FrameCache::new(Duration::from_secs(u64::MAX));
        let key = window("2020-01-01", "2024-01-01");

        cache.put(key, Arc::new(SeriesFrame::default())).await;
        cache.clear_expired().await;

        assert!(cache.get(&key).await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn disabled_cache_never_stores() {
        let cache = TtlCache::<&'static str, u32>::disabled();
        cache.put("key", 1).await;
        assert_eq!(cache.get(&"key").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = TtlCache::<&'static str, u32>::new(Duration::from_secs(60));
        let clone = cache.clone();
        cache.put("key", 7).await;
        assert_eq!(clone.get(&"key").await, Some(7));
        clone.clear().await;
        assert!(cache.is_empty().await);
    }

    #[test]
    fn cache_mode_read_write_matrix() {
        assert_eq!(CacheMode::default(), CacheMode::Use);
        assert!(CacheMode::Use.reads() && CacheMode::Use.writes());
        assert!(!CacheMode::Refresh.reads() && CacheMode::Refresh.writes());
        assert!(!CacheMode::Bypass.reads() && !CacheMode::Bypass.writes());
    }
}
