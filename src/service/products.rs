//! Product Service
//!
//! Cache-aside coordinator: reads go L1 → L2 → store, writes go to the
//! store and then invalidate both tiers.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{AllProductsEntry, CacheKey, DistributedCache, LocalCache, LocalCaches};
use crate::error::{CatalogError, Result};
use crate::models::{Product, ProductId};
use crate::repository::ProductRepository;

/// Runs a store call unless `cancel` fires first.
async fn until_cancelled<T, F>(cancel: &CancellationToken, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = call => result,
    }
}

// == Product Service ==
/// Catalog operations with two-tier cache-aside.
///
/// The store is always authoritative; cached copies may lag by up to one
/// TTL. Concurrent misses on the same key each go to the store.
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    distributed: Arc<DistributedCache>,
    local: LocalCaches,
    /// Keys whose L2 delete failed after a write, with the time of the
    /// failure. Lives for the L2 default TTL, after which any entry written
    /// before the write has expired.
    unconfirmed: LocalCache<CacheKey, Instant>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        distributed: Arc<DistributedCache>,
        local: LocalCaches,
    ) -> Self {
        let unconfirmed = LocalCache::new(distributed.default_ttl());
        Self {
            repository,
            distributed,
            local,
            unconfirmed,
        }
    }

    // == Get All ==
    /// Returns every product.
    pub async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Product>> {
        let key = CacheKey::AllProducts;

        if let Some(entry) = self.local.all_products.try_get(&key) {
            debug!("All products served from L1");
            return Ok(entry.items);
        }

        if let Some(items) = self.read_l2::<Vec<Product>>(key, cancel).await {
            debug!(count = items.len(), "All products served from L2");
            self.local
                .all_products
                .put(key, AllProductsEntry::new(items.clone()));
            return Ok(items);
        }

        let loaded_at = Instant::now();
        let items = until_cancelled(cancel, self.repository.get_all()).await?;
        debug!(count = items.len(), "All products loaded from store");
        self.write_l2(key, &items, loaded_at, cancel).await;
        self.local
            .all_products
            .put(key, AllProductsEntry::new(items.clone()));
        Ok(items)
    }

    // == Get By Id ==
    /// Returns one product, or `None` when the store has no such id.
    ///
    /// Absence is not cached; the next lookup asks the store again.
    pub async fn get_by_id(
        &self,
        id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<Option<Product>> {
        let key = CacheKey::product(id);

        if let Some(product) = self.local.products.try_get(&key) {
            debug!(%id, "Product served from L1");
            return Ok(Some(product));
        }

        if let Some(product) = self.read_l2::<Product>(key, cancel).await {
            debug!(%id, "Product served from L2");
            self.local.products.put(key, product.clone());
            return Ok(Some(product));
        }

        let loaded_at = Instant::now();
        let Some(product) = until_cancelled(cancel, self.repository.get_by_id(id)).await? else {
            debug!(%id, "Product not found in store");
            return Ok(None);
        };

        debug!(%id, "Product loaded from store");
        self.write_l2(key, &product, loaded_at, cancel).await;
        self.local.products.put(key, product.clone());
        Ok(Some(product))
    }

    // == Create ==
    /// Stores a new product and invalidates the affected cache entries.
    pub async fn create(&self, product: Product, cancel: &CancellationToken) -> Result<Product> {
        let created = until_cancelled(cancel, self.repository.add(product)).await?;
        info!(id = %created.id, "Product created");
        self.invalidate(created.id).await;
        Ok(created)
    }

    // == Update ==
    /// Replaces the product with `id`.
    ///
    /// Returns `false` without touching any cache when the id is unknown.
    pub async fn update(
        &self,
        id: ProductId,
        product: Product,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let product = product.with_id(id);
        let updated = until_cancelled(cancel, self.repository.update(&product)).await?;
        if updated {
            info!(%id, "Product updated");
            self.invalidate(id).await;
        }
        Ok(updated)
    }

    // == Delete ==
    /// Removes the product with `id`.
    ///
    /// Returns `false` without touching any cache when the id is unknown.
    pub async fn delete(&self, id: ProductId, cancel: &CancellationToken) -> Result<bool> {
        let deleted = until_cancelled(cancel, self.repository.delete(id)).await?;
        if deleted {
            info!(%id, "Product deleted");
            self.invalidate(id).await;
        }
        Ok(deleted)
    }

    // == Invalidate ==
    /// Drops the product entry and the all-products entry from both tiers.
    ///
    /// Runs after a committed store write, so it ignores the caller's
    /// cancellation: skipping it would leave stale entries behind. A key
    /// whose L2 delete fails is marked unconfirmed before L1 is cleared, so
    /// no read on this node can promote the old L2 copy.
    async fn invalidate(&self, id: ProductId) {
        let product_key = CacheKey::product(id);
        let all_key = CacheKey::AllProducts;
        let detached = CancellationToken::new();

        for key in [product_key, all_key] {
            if !self.distributed.remove(&key.logical(), &detached).await {
                warn!(key = %key, "L2 invalidation failed, bypassing L2 for this key");
                self.unconfirmed.put(key, Instant::now());
            }
        }
        self.local.products.remove(&product_key);
        self.local.all_products.remove(&all_key);
        debug!(%id, "Cache entries invalidated");
    }

    /// L2 lookup that skips keys whose last invalidation never reached L2.
    async fn read_l2<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        cancel: &CancellationToken,
    ) -> Option<T> {
        if self.unconfirmed.contains(&key) {
            debug!(key = %key, "L2 copy unconfirmed, reading store");
            return None;
        }
        self.distributed.get(&key.logical(), cancel).await
    }

    /// Stores a value read from the store at `loaded_at` into L2.
    ///
    /// A successful write replaces any stale L2 copy, so the unconfirmed
    /// marker is dropped when it predates the store read.
    async fn write_l2<T: Serialize + ?Sized>(
        &self,
        key: CacheKey,
        value: &T,
        loaded_at: Instant,
        cancel: &CancellationToken,
    ) {
        if self.distributed.set(&key.logical(), value, None, cancel).await
            && self
                .unconfirmed
                .remove_if(&key, |marked_at| *marked_at < loaded_at)
        {
            debug!(key = %key, "L2 copy refreshed, marker cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use crate::repository::InMemoryProductRepository;
    use bigdecimal::BigDecimal;
    use std::time::Duration;

    struct Fixture {
        repo: Arc<InMemoryProductRepository>,
        backend: Arc<MemoryBackend>,
        local: LocalCaches,
        service: ProductService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryProductRepository::new());
        let backend = Arc::new(MemoryBackend::new());
        let distributed = Arc::new(DistributedCache::new(
            backend.clone(),
            "t:",
            Duration::from_secs(300),
        ));
        let local = LocalCaches::new(Duration::from_secs(120), Duration::from_secs(30));
        let service = ProductService::new(repo.clone(), distributed, local.clone());
        Fixture {
            repo,
            backend,
            local,
            service,
        }
    }

    fn widget() -> Product {
        Product::new("Widget", "Tools", "9.99".parse::<BigDecimal>().unwrap())
    }

    #[tokio::test]
    async fn test_get_by_id_populates_both_tiers() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let stored = f.repo.add(widget()).await.unwrap();

        let found = f.service.get_by_id(stored.id, &cancel).await.unwrap();

        assert_eq!(found, Some(stored.clone()));
        assert!(f.local.products.contains(&CacheKey::product(stored.id)));
        assert!(f
            .backend
            .contains_key(&format!("t:products:{}", stored.id)));
    }

    #[tokio::test]
    async fn test_get_by_id_l2_hit_fills_l1() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let stored = f.repo.add(widget()).await.unwrap();
        f.service.get_by_id(stored.id, &cancel).await.unwrap();

        f.local.products.clear();
        f.repo.delete(stored.id).await.unwrap();

        // Still served from L2 even though the store lost it
        let found = f.service.get_by_id(stored.id, &cancel).await.unwrap();
        assert_eq!(found, Some(stored.clone()));
        assert!(f.local.products.contains(&CacheKey::product(stored.id)));
    }

    #[tokio::test]
    async fn test_missing_product_is_not_cached() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let id = ProductId::new();

        assert_eq!(f.service.get_by_id(id, &cancel).await.unwrap(), None);
        assert!(f.local.products.is_empty());
        assert!(f.backend.keys().is_empty());

        f.repo.add(widget().with_id(id)).await.unwrap();
        assert!(f.service.get_by_id(id, &cancel).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_all_populates_both_tiers() {
        let f = fixture();
        let cancel = CancellationToken::new();
        f.repo.add(widget()).await.unwrap();

        let all = f.service.get_all(&cancel).await.unwrap();

        assert_eq!(all.len(), 1);
        assert!(f.local.all_products.contains(&CacheKey::AllProducts));
        assert!(f.backend.contains_key("t:products:all"));
    }

    #[tokio::test]
    async fn test_write_invalidates_both_keys_in_both_tiers() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let stored = f.repo.add(widget()).await.unwrap();
        f.service.get_all(&cancel).await.unwrap();
        f.service.get_by_id(stored.id, &cancel).await.unwrap();

        let updated = f
            .service
            .update(stored.id, widget(), &cancel)
            .await
            .unwrap();

        assert!(updated);
        assert!(f.local.products.is_empty());
        assert!(f.local.all_products.is_empty());
        assert!(f.backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_does_not_invalidate() {
        let f = fixture();
        let cancel = CancellationToken::new();
        f.repo.add(widget()).await.unwrap();
        f.service.get_all(&cancel).await.unwrap();

        let ghost = ProductId::new();
        assert!(!f.service.update(ghost, widget(), &cancel).await.unwrap());
        assert!(!f.service.delete(ghost, &cancel).await.unwrap());

        assert!(f.local.all_products.contains(&CacheKey::AllProducts));
        assert!(f.backend.contains_key("t:products:all"));
    }

    #[tokio::test]
    async fn test_update_during_l2_outage_not_undone_on_recovery() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let stored = f.repo.add(widget()).await.unwrap();
        f.service.get_by_id(stored.id, &cancel).await.unwrap();
        f.service.get_all(&cancel).await.unwrap();

        f.backend.set_available(false);
        let gadget = Product::new("Gadget", "Tools", BigDecimal::from(5));
        assert!(f.service.update(stored.id, gadget, &cancel).await.unwrap());
        f.backend.set_available(true);

        // The old L2 copies are still there
        assert!(f
            .backend
            .contains_key(&format!("t:products:{}", stored.id)));
        assert!(f.backend.contains_key("t:products:all"));

        let found = f.service.get_by_id(stored.id, &cancel).await.unwrap().unwrap();
        assert_eq!(found.name, "Gadget");
        let all = f.service.get_all(&cancel).await.unwrap();
        assert_eq!(all[0].name, "Gadget");

        // The fresh reads overwrote L2 and cleared the markers
        assert!(!f.service.unconfirmed.contains(&CacheKey::product(stored.id)));
        assert!(!f.service.unconfirmed.contains(&CacheKey::AllProducts));
        f.local.clear();
        let from_l2 = f.service.get_by_id(stored.id, &cancel).await.unwrap().unwrap();
        assert_eq!(from_l2.name, "Gadget");
    }

    #[tokio::test]
    async fn test_unconfirmed_marker_kept_while_l2_down() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let stored = f.repo.add(widget()).await.unwrap();
        f.service.get_by_id(stored.id, &cancel).await.unwrap();

        f.backend.set_available(false);
        assert!(f.service.delete(stored.id, &cancel).await.unwrap());
        assert_eq!(f.service.get_by_id(stored.id, &cancel).await.unwrap(), None);
        f.backend.set_available(true);

        // Absence is not written to L2, so the stale copy stays bypassed
        assert!(f.service.unconfirmed.contains(&CacheKey::product(stored.id)));
        assert_eq!(f.service.get_by_id(stored.id, &cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_marker_placed_after_store_read_survives_write() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let key = CacheKey::product(ProductId::new());

        let loaded_at = Instant::now();
        f.service.unconfirmed.put(key, Instant::now());
        f.service.write_l2(key, &"x", loaded_at, &cancel).await;

        assert!(f.service.unconfirmed.contains(&key));
    }

    #[tokio::test]
    async fn test_cancelled_store_read() {
        let f = fixture();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = f.service.get_all(&cancel).await;

        assert!(matches!(result, Err(CatalogError::Cancelled)));
        assert!(f.local.all_products.is_empty());
        assert!(f.backend.keys().is_empty());
    }
}
