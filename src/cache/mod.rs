//! Cache Module
//!
//! Two cache tiers in front of the product store:
//! - L1: in-process `LocalCache` with absolute per-entry TTL
//! - L2: `DistributedCache`, a fail-open, namespaced view over a
//!   `CacheBackend` (Redis, or an in-process stand-in)

pub mod backend;
mod distributed;
mod entry;
mod keys;
mod local;
mod redis_backend;
mod stats;


// Re-export public types
pub use backend::{BackendError, BackendResult, CacheBackend, MemoryBackend};
pub use distributed::DistributedCache;
pub use entry::{AllProductsEntry, CacheEntry};
pub use keys::{CacheKey, PRODUCTS_PREFIX};
pub use local::{LocalCache, LocalCaches};
pub use redis_backend::RedisBackend;
pub use stats::CacheStatistics;
