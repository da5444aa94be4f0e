//! Repository Module
//!
//! The product store is the source of truth. The cache tiers only ever read
//! from it and never write to it.

mod memory;
mod seed;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Product, ProductId};

pub use memory::InMemoryProductRepository;
pub use seed::seed_products;

// == Product Repository Trait ==
/// Keyed record store for products.
///
/// Not-found is a normal outcome (`None` / `false`); `Err` means the store
/// itself failed.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, ordered by name.
    async fn get_all(&self) -> Result<Vec<Product>>;

    /// A single product.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Stores a new product, assigning an id when it has the default one.
    async fn add(&self, product: Product) -> Result<Product>;

    /// Replaces the mutable fields of an existing product.
    async fn update(&self, product: &Product) -> Result<bool>;

    /// Removes a product.
    async fn delete(&self, id: ProductId) -> Result<bool>;
}
