//! Distributed (L2) Cache Module
//!
//! Best-effort, fail-open cache service over a `CacheBackend`. Handles key
//! namespacing and JSON serialization.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::backend::{BackendResult, CacheBackend};
use crate::cache::CacheStatistics;
use crate::config::Config;

// == Distributed Cache ==
/// Namespaced, serializing view over the shared backing store.
///
/// Every backend call goes through one fail-open boundary: transport
/// errors, decode errors and cancellation all come back as a miss or a
/// no-op. Callers cannot tell "absent" from "cache down".
pub struct DistributedCache {
    backend: Arc<dyn CacheBackend>,
    namespace: String,
    default_ttl: Duration,
}

impl DistributedCache {
    // == Constructor ==
    /// Creates a cache over `backend`, prefixing every key with `namespace`.
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        namespace: impl Into<String>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            default_ttl,
        }
    }

    /// Creates a cache using the configured namespace and default TTL.
    pub fn from_config(backend: Arc<dyn CacheBackend>, config: &Config) -> Self {
        Self::new(backend, config.key_prefix.clone(), config.default_ttl())
    }

    /// Full backing-store key for a logical key.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Fail-Open Boundary ==
    /// Runs a backend call, turning failure or cancellation into `None`.
    async fn fail_open<T, F>(
        &self,
        op: &'static str,
        key: &str,
        cancel: &CancellationToken,
        call: F,
    ) -> Option<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(op, key = %key, "L2 call cancelled");
                None
            }
            result = call => match result {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(op, key = %key, error = %e, "L2 call failed, continuing without cache");
                    None
                }
            }
        }
    }

    // == Get ==
    /// Looks up and decodes a value.
    ///
    /// Returns `None` on a miss, an unreachable store, a payload that does
    /// not decode as `T`, or cancellation.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, cancel: &CancellationToken) -> Option<T> {
        let full_key = self.namespaced(key);
        let raw = self
            .fail_open("get", key, cancel, self.backend.get(&full_key))
            .await
            .flatten();

        let Some(raw) = raw else {
            debug!(key = %key, "L2 miss");
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "L2 hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "L2 payload did not decode, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Encodes and stores a value with `ttl`, or the default TTL.
    ///
    /// Failures are logged and dropped. Returns `true` only when the store
    /// acknowledged the write.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "L2 payload did not encode, skipping set");
                return false;
            }
        };

        let full_key = self.namespaced(key);
        let ttl = ttl.unwrap_or(self.default_ttl);
        let stored = self
            .fail_open("set", key, cancel, self.backend.set_ex(&full_key, &payload, ttl))
            .await
            .is_some();
        if stored {
            debug!(key = %key, ttl_secs = ttl.as_secs(), "L2 set");
        }
        stored
    }

    // == Remove ==
    /// Deletes a single key. Failures are logged and dropped.
    ///
    /// Returns `true` when the delete reached the store, whether or not the
    /// key existed; `false` means any previous value may still be there.
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> bool {
        let full_key = self.namespaced(key);
        match self
            .fail_open("remove", key, cancel, self.backend.del(&full_key))
            .await
        {
            Some(existed) => {
                debug!(key = %key, existed, "L2 remove");
                true
            }
            None => false,
        }
    }

    // == Remove By Prefix ==
    /// Deletes every key whose logical form starts with `prefix`.
    ///
    /// Not atomic: keys written while the scan runs may survive. Returns
    /// the number of keys deleted.
    pub async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> usize {
        let full_prefix = self.namespaced(prefix);
        let Some(keys) = self
            .fail_open(
                "remove_by_prefix",
                prefix,
                cancel,
                self.backend.keys_with_prefix(&full_prefix),
            )
            .await
        else {
            return 0;
        };

        let mut removed = 0;
        for full_key in &keys {
            if let Some(true) = self
                .fail_open("remove_by_prefix", full_key, cancel, self.backend.del(full_key))
                .await
            {
                removed += 1;
            }
        }

        debug!(prefix = %prefix, matched = keys.len(), removed, "L2 prefix removal");
        removed
    }

    // == Availability ==
    /// Reports whether the backing store is reachable.
    pub async fn is_available(&self) -> bool {
        self.backend.is_connected().await
    }

    // == Statistics ==
    /// Best-effort counters from the store; zeroed when it cannot be read.
    pub async fn statistics(&self, cancel: &CancellationToken) -> CacheStatistics {
        self.fail_open("statistics", "INFO", cancel, self.backend.info())
            .await
            .map(|info| CacheStatistics::from_info(&info))
            .unwrap_or_default()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        qty: u32,
    }

    fn setup() -> (Arc<MemoryBackend>, DistributedCache) {
        let backend = Arc::new(MemoryBackend::new());
        let cache = DistributedCache::new(backend.clone(), "test:", Duration::from_secs(300));
        (backend, cache)
    }

    fn item() -> Item {
        Item {
            name: "widget".to_string(),
            qty: 3,
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (backend, cache) = setup();
        let cancel = CancellationToken::new();

        cache.set("items:1", &item(), None, &cancel).await;

        assert!(backend.contains_key("test:items:1"));
        assert_eq!(cache.get::<Item>("items:1", &cancel).await, Some(item()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_, cache) = setup();
        assert_eq!(
            cache.get::<Item>("nope", &CancellationToken::new()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_explicit_ttl_overrides_default() {
        let (backend, cache) = setup();
        let cancel = CancellationToken::new();

        assert!(
            cache
                .set("short", &item(), Some(Duration::from_secs(1)), &cancel)
                .await
        );
        assert!(backend.contains_key("test:short"));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(!backend.contains_key("test:short"));
        assert_eq!(cache.get::<Item>("short", &cancel).await, None);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let (_, cache) = setup();
        let cancel = CancellationToken::new();

        cache.set("items:1", &"just a string", None, &cancel).await;

        assert_eq!(cache.get::<Item>("items:1", &cancel).await, None);
    }

    #[tokio::test]
    async fn test_remove() {
        let (backend, cache) = setup();
        let cancel = CancellationToken::new();

        cache.set("items:1", &item(), None, &cancel).await;
        assert!(cache.remove("items:1", &cancel).await);
        // Deleting a missing key still reaches the store
        assert!(cache.remove("items:1", &cancel).await);

        assert!(!backend.contains_key("test:items:1"));
    }

    #[tokio::test]
    async fn test_remove_by_prefix_leaves_other_keys() {
        let (backend, cache) = setup();
        let cancel = CancellationToken::new();

        cache.set("products:1", &item(), None, &cancel).await;
        cache.set("products:all", &vec![item()], None, &cancel).await;
        cache.set("orders:1", &item(), None, &cancel).await;
        backend
            .set_ex("other:products:1", "x", Duration::from_secs(60))
            .await
            .unwrap();

        let removed = cache.remove_by_prefix("products", &cancel).await;

        assert_eq!(removed, 2);
        assert!(!backend.contains_key("test:products:1"));
        assert!(!backend.contains_key("test:products:all"));
        assert!(backend.contains_key("test:orders:1"));
        assert!(backend.contains_key("other:products:1"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_open() {
        let (backend, cache) = setup();
        let cancel = CancellationToken::new();
        cache.set("items:1", &item(), None, &cancel).await;

        backend.set_available(false);

        assert!(!cache.is_available().await);
        assert_eq!(cache.get::<Item>("items:1", &cancel).await, None);
        assert!(!cache.set("items:2", &item(), None, &cancel).await);
        assert!(!cache.remove("items:1", &cancel).await);
        assert_eq!(cache.remove_by_prefix("items", &cancel).await, 0);
        assert_eq!(cache.statistics(&cancel).await, CacheStatistics::default());

        backend.set_available(true);
        assert!(backend.contains_key("test:items:1"));
        assert!(!backend.contains_key("test:items:2"));
    }

    #[tokio::test]
    async fn test_cancelled_calls_are_no_ops() {
        let (backend, cache) = setup();
        let live = CancellationToken::new();
        cache.set("items:1", &item(), None, &live).await;

        let cancelled = CancellationToken::new();
        cancelled.cancel();

        assert_eq!(cache.get::<Item>("items:1", &cancelled).await, None);
        assert!(!cache.set("items:2", &item(), None, &cancelled).await);
        assert!(!cache.remove("items:1", &cancelled).await);

        assert!(backend.contains_key("test:items:1"));
        assert!(!backend.contains_key("test:items:2"));
    }

    #[tokio::test]
    async fn test_statistics() {
        let (_, cache) = setup();
        let cancel = CancellationToken::new();

        cache.set("a", &1, None, &cancel).await;
        cache.get::<u32>("a", &cancel).await;
        cache.get::<u32>("b", &cancel).await;

        let stats = cache.statistics(&cancel).await;
        assert_eq!(stats.keys, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
