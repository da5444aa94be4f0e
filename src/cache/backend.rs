//! Cache Backend Module
//!
//! Transport seam between the distributed cache service and the store that
//! actually holds the keys.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::cache::CacheEntry;

// == Backend Error ==
/// Transport-level failure talking to the backing store.
///
/// Never escapes `DistributedCache`; it is logged and turned into a miss.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The store cannot be reached
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer in time
    #[error("Backing store timed out after {0:?}")]
    Timeout(Duration),

    /// Redis reported an error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// TTL a backend actually applies: whole seconds, never less than one.
///
/// Redis `SETEX` only takes a positive number of seconds, so every
/// transport stores a requested TTL the same way.
pub fn effective_ttl(ttl: Duration) -> Duration {
    Duration::from_secs(ttl.as_secs().max(1))
}

// == Cache Backend Trait ==
/// String-keyed store with per-key TTL.
///
/// Keys passed here are already namespaced.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Reads a raw value.
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Writes a raw value that expires after `effective_ttl(ttl)`.
    ///
    /// Sub-second parts are truncated and anything under one second,
    /// including zero, is stored for one second.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> BackendResult<()>;

    /// Deletes a key, returning whether it existed.
    async fn del(&self, key: &str) -> BackendResult<bool>;

    /// Lists every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> BackendResult<Vec<String>>;

    /// Reports whether the store is reachable right now.
    async fn is_connected(&self) -> bool;

    /// Returns the store's free-form introspection text (Redis `INFO` format).
    async fn info(&self) -> BackendResult<String>;
}

// == Memory Backend ==
/// In-process stand-in for Redis.
///
/// Used when no Redis server is configured and in tests. Availability can be
/// switched off to simulate an outage: every call then fails the way an
/// unreachable Redis would.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: DashMap<String, CacheEntry<String>>,
    available: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Simulates the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// True if a live key is stored, regardless of availability.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    /// Live keys currently stored, regardless of availability.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn ensure_available(&self) -> BackendResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable(
                "in-memory backend switched off".to_string(),
            ))
        }
    }

    fn drop_if_expired(&self, key: &str) {
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired())
            .is_some()
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.ensure_available()?;
        self.drop_if_expired(key);

        let value = self.entries.get(key).map(|entry| entry.value.clone());
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> BackendResult<()> {
        self.ensure_available()?;
        self.entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), effective_ttl(ttl)));
        Ok(())
    }

    async fn del(&self, key: &str) -> BackendResult<bool> {
        self.ensure_available()?;
        Ok(self.entries.remove(key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> BackendResult<Vec<String>> {
        self.ensure_available()?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && !entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn is_connected(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn info(&self) -> BackendResult<String> {
        self.ensure_available()?;
        // Every entry carries a TTL, so expires always equals keys
        let keys = self
            .entries
            .iter()
            .filter(|entry| !entry.is_expired())
            .count();

        Ok(format!(
            "# Stats\r\nkeyspace_hits:{}\r\nkeyspace_misses:{}\r\nevicted_keys:{}\r\n\r\n# Keyspace\r\ndb0:keys={},expires={},avg_ttl=0\r\n",
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
            keys,
            keys,
        ))
    }
}
