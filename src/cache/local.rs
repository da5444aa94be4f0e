//! Local (L1) Cache Module
//!
//! In-process keyed storage with a fixed absolute TTL per cache instance.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::cache::{AllProductsEntry, CacheEntry, CacheKey};
use crate::config::Config;
use crate::models::Product;

// == Local Cache ==
/// Concurrent in-process cache.
///
/// Every entry expires `ttl` after it was put. Expired entries read as
/// absent whether or not they have been purged yet. All methods take
/// `&self`; the map shards handle locking.
#[derive(Debug)]
pub struct LocalCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> LocalCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The lifetime given to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Try Get ==
    /// Returns the value if a live entry exists.
    ///
    /// An expired entry is dropped from the map on the way out.
    pub fn try_get(&self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        // Re-check under the shard lock: a concurrent put may have replaced it
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    // == Put ==
    /// Inserts or replaces an entry, resetting its expiration to now + ttl.
    pub fn put(&self, key: K, value: V) {
        self.entries.insert(key, CacheEntry::new(value, self.ttl));
    }

    // == Remove ==
    /// Removes an entry. Absent keys are ignored.
    pub fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Removes an entry only when `predicate` accepts its value.
    ///
    /// Returns whether an entry was removed.
    pub fn remove_if(&self, key: &K, predicate: impl FnOnce(&V) -> bool) -> bool {
        self.entries
            .remove_if(key, |_, entry| predicate(&entry.value))
            .is_some()
    }

    // == Contains ==
    /// True if a live entry exists for the key.
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Snapshot ==
    /// Returns all live values, in no particular order.
    pub fn snapshot(&self) -> Vec<V> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
            .collect()
    }

    // == Length ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired())
            .count()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // == Purge Expired ==
    /// Physically removes expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired();
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

// == Local Caches ==
/// The two L1 caches used by the catalog.
///
/// Single products and the all-products list live in separate caches so the
/// list can carry a shorter TTL. Cloning shares the underlying maps.
#[derive(Debug, Clone)]
pub struct LocalCaches {
    /// Single product entries, keyed by `CacheKey::Product`
    pub products: Arc<LocalCache<CacheKey, Product>>,
    /// The all-products entry, keyed by `CacheKey::AllProducts`
    pub all_products: Arc<LocalCache<CacheKey, AllProductsEntry>>,
}

impl LocalCaches {
    pub fn new(product_ttl: Duration, all_products_ttl: Duration) -> Self {
        Self {
            products: Arc::new(LocalCache::new(product_ttl)),
            all_products: Arc::new(LocalCache::new(all_products_ttl)),
        }
    }

    /// Builds both caches with the configured TTLs.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.product_ttl(), config.all_products_ttl())
    }

    /// Drops every entry from both caches.
    pub fn clear(&self) {
        self.products.clear();
        self.all_products.clear();
    }

    /// Purges expired entries from both caches, returning the total removed.
    pub fn purge_expired(&self) -> usize {
        self.products.purge_expired() + self.all_products.purge_expired()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn cache() -> LocalCache<String, String> {
        LocalCache::new(Duration::from_secs(300))
    }

    #[test]
    fn test_put_and_try_get() {
        let cache = cache();

        cache.put("key1".to_string(), "value1".to_string());

        assert_eq!(cache.try_get(&"key1".to_string()), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_try_get_nonexistent() {
        let cache = cache();
        assert_eq!(cache.try_get(&"missing".to_string()), None);
    }

    #[test]
    fn test_overwrite() {
        let cache = cache();

        cache.put("key1".to_string(), "value1".to_string());
        cache.put("key1".to_string(), "value2".to_string());

        assert_eq!(cache.try_get(&"key1".to_string()), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let cache = cache();

        cache.put("key1".to_string(), "value1".to_string());
        cache.remove(&"key1".to_string());
        cache.remove(&"key1".to_string());

        assert!(cache.is_empty());
        assert!(!cache.contains(&"key1".to_string()));
    }

    #[test]
    fn test_expired_entry_reads_absent() {
        let cache = LocalCache::new(Duration::from_millis(50));

        cache.put("key1".to_string(), "value1".to_string());
        assert!(cache.contains(&"key1".to_string()));

        sleep(Duration::from_millis(80));

        assert!(!cache.contains(&"key1".to_string()));
        assert_eq!(cache.len(), 0);
        assert!(cache.snapshot().is_empty());
        assert_eq!(cache.try_get(&"key1".to_string()), None);
    }

    #[test]
    fn test_try_get_purges_expired_entry() {
        let cache: LocalCache<u32, u32> = LocalCache::new(Duration::ZERO);

        cache.put(1, 1);
        assert_eq!(cache.entries.len(), 1);

        assert_eq!(cache.try_get(&1), None);
        assert_eq!(cache.entries.len(), 0);
    }

    #[test]
    fn test_put_resets_expiration() {
        let cache = LocalCache::new(Duration::from_millis(100));

        cache.put(1u32, "a");
        sleep(Duration::from_millis(60));
        cache.put(1u32, "b");
        sleep(Duration::from_millis(60));

        assert_eq!(cache.try_get(&1), Some("b"));
    }

    #[test]
    fn test_snapshot_skips_expired() {
        let cache = LocalCache::new(Duration::from_millis(50));
        cache.put(1u32, "old");
        sleep(Duration::from_millis(80));
        cache.put(2u32, "fresh");

        assert_eq!(cache.snapshot(), vec!["fresh"]);
    }

    #[test]
    fn test_purge_expired() {
        let short: LocalCache<u32, u32> = LocalCache::new(Duration::ZERO);
        short.put(1, 1);
        short.put(2, 2);

        assert_eq!(short.purge_expired(), 2);
        assert_eq!(short.entries.len(), 0);

        let long = cache();
        long.put("k".to_string(), "v".to_string());
        assert_eq!(long.purge_expired(), 0);
        assert_eq!(long.len(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(LocalCache::new(Duration::from_secs(60)));

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100u32 {
                        let key = (t * 1000) + i;
                        cache.put(key, i);
                        assert_eq!(cache.try_get(&key), Some(i));
                        if i % 2 == 0 {
                            cache.remove(&key);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8 * 50);
    }

    #[test]
    fn test_local_caches_use_separate_ttls() {
        let caches = LocalCaches::new(Duration::from_secs(120), Duration::from_secs(30));
        assert_eq!(caches.products.ttl(), Duration::from_secs(120));
        assert_eq!(caches.all_products.ttl(), Duration::from_secs(30));

        caches
            .all_products
            .put(CacheKey::AllProducts, AllProductsEntry::default());
        assert!(caches.all_products.contains(&CacheKey::AllProducts));

        caches.clear();
        assert!(caches.all_products.is_empty());
    }
}
