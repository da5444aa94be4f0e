//! In-memory product store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{Product, ProductId};
use crate::repository::ProductRepository;

/// Product store kept in a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn add(&self, mut product: Product) -> Result<Product> {
        if product.id.is_default() {
            product.id = ProductId::new();
        }
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let mut products = self.products.write().await;
        let Some(existing) = products.get_mut(&product.id) else {
            return Ok(false);
        };

        // Identity and creation time belong to the stored record
        existing.name = product.name.clone();
        existing.description = product.description.clone();
        existing.price = product.price.clone();
        existing.category = product.category.clone();
        Ok(true)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}
