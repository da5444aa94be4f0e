//! Cache Key Module
//!
//! Typed cache keys shared by the L1 and L2 tiers.

use std::fmt;

use crate::models::ProductId;

/// Logical prefix shared by every product cache key
pub const PRODUCTS_PREFIX: &str = "products";

/// Identifier segment of the all-products key
const ALL_SEGMENT: &str = "all";

// == Cache Key ==
/// Identifies one cached value.
///
/// Keys are plain values: equal inputs always yield equal keys. The logical
/// string form is `products:<id>` for a single product and `products:all`
/// for the whole list; the L2 namespace is applied separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single product
    Product(ProductId),
    /// The materialized list of all products
    AllProducts,
}

impl CacheKey {
    /// Key for a single product.
    pub fn product(id: ProductId) -> Self {
        CacheKey::Product(id)
    }

    /// Logical key without the L2 namespace.
    pub fn logical(&self) -> String {
        match self {
            CacheKey::Product(id) => format!("{}:{}", PRODUCTS_PREFIX, id),
            CacheKey::AllProducts => format!("{}:{}", PRODUCTS_PREFIX, ALL_SEGMENT),
        }
    }

    /// Full backing-store key under the given namespace.
    pub fn namespaced(&self, namespace: &str) -> String {
        format!("{}{}", namespace, self.logical())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.logical())
    }
}
