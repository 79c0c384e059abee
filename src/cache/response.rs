use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};

/// Bounded TTL cache of finished responses keyed by request hash.
///
/// Values are shared behind `Arc` so hits never clone the response body.
pub struct ResponseCache<V> {
    entries: Cache<u64, Arc<V>>,
}

impl<V> ResponseCache<V>
where
    V: Send + Sync + 'static,
{
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(
            DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    /// Creates a cache with a max entry capacity and time-to-live.
    #[inline]
    pub fn with_capacity_and_ttl(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    #[inline]
    pub fn get(&self, key: u64) -> Option<Arc<V>> {
        self.entries.get(&key)
    }

    /// Stores `value` and returns the shared handle.
    #[inline]
    pub fn insert(&self, key: u64, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    #[inline]
    pub fn remove(&self, key: u64) -> Option<Arc<V>> {
        self.entries.remove(&key)
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Approximate until [`Self::run_pending_tasks`] has run.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl<V> Default for ResponseCache<V>
where
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::request_key;

    #[test]
    fn test_insert_and_get() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let key = request_key("score", &("guess", "actual")).unwrap();
        assert!(cache.get(key).is_none());

        cache.insert(key, "hit".to_string());
        assert_eq!(cache.get(key).as_deref().map(String::as_str), Some("hit"));
        assert!(cache.contains(key));
    }

    #[test]
    fn test_hits_share_allocation() {
        let cache = ResponseCache::new();
        let stored = cache.insert(7, vec![1u8, 2, 3]);
        let fetched = cache.get(7).unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ResponseCache::new();
        cache.insert(1, 1u32);
        cache.insert(2, 2u32);
        assert_eq!(cache.remove(1).as_deref(), Some(&1));
        assert!(!cache.contains(1));

        cache.clear();
        cache.run_pending_tasks();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_bound() {
        let cache = ResponseCache::with_capacity_and_ttl(2, Duration::from_secs(60));
        for i in 0..50u64 {
            cache.insert(i, i);
        }
        cache.run_pending_tasks();
        assert!(cache.len() <= 2);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ResponseCache::with_capacity_and_ttl(16, Duration::from_millis(20));
        cache.insert(1, "x");
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get(1).is_none());
    }
}
