//! Cache Admin
//!
//! Inspection and maintenance operations over the two cache tiers. Used for
//! health checks and operational visibility; the read/write protocol never
//! goes through here.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::{CacheKey, CacheStatistics, DistributedCache, LocalCaches, PRODUCTS_PREFIX};
use crate::models::ProductId;

/// Inspection and flushing of the cache tiers.
pub struct CacheAdmin {
    distributed: Arc<DistributedCache>,
    local: LocalCaches,
}

impl CacheAdmin {
    pub fn new(distributed: Arc<DistributedCache>, local: LocalCaches) -> Self {
        Self { distributed, local }
    }

    /// Best-effort L2 counters.
    pub async fn statistics(&self, cancel: &CancellationToken) -> CacheStatistics {
        self.distributed.statistics(cancel).await
    }

    /// Whether the L2 store is reachable.
    pub async fn is_available(&self) -> bool {
        self.distributed.is_available().await
    }

    /// Removes one L2 key by its logical name.
    pub async fn remove(&self, key: &str, cancel: &CancellationToken) {
        self.distributed.remove(key, cancel).await;
    }

    /// Removes every L2 key whose logical name starts with `prefix`.
    pub async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> usize {
        self.distributed.remove_by_prefix(prefix, cancel).await
    }

    /// Flushes every product entry from both tiers.
    pub async fn clear(&self, cancel: &CancellationToken) {
        let removed = self
            .distributed
            .remove_by_prefix(PRODUCTS_PREFIX, cancel)
            .await;
        self.distributed
            .remove(&CacheKey::AllProducts.logical(), cancel)
            .await;
        self.local.clear();
        info!(l2_removed = removed, "Product caches cleared");
    }

    /// Live single-product entries in L1.
    pub fn local_count(&self) -> usize {
        self.local.products.len()
    }

    /// Whether L1 currently holds the all-products list.
    pub fn local_has_all_products(&self) -> bool {
        self.local.all_products.contains(&CacheKey::AllProducts)
    }

    /// Whether L1 holds a live entry for the product.
    pub fn local_contains(&self, id: ProductId) -> bool {
        self.local.products.contains(&CacheKey::product(id))
    }

    /// Drops the product's L1 entry.
    pub fn local_evict(&self, id: ProductId) {
        self.local.products.remove(&CacheKey::product(id));
    }
}
