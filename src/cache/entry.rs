//! Cache Entry Module
//!
//! Defines the structure for individual L1 cache entries with absolute TTL.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::Product;

// == Cache Entry ==
/// Represents a single L1 entry with value and expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion time
    pub created_at: Instant,
    /// Absolute expiration time, fixed at insertion
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` after now.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration time.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == All Products Entry ==
/// The whole product list as one cache value.
///
/// Replaced as a unit, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllProductsEntry {
    /// Products in store order
    pub items: Vec<Product>,
}

impl AllProductsEntry {
    pub fn new(items: Vec<Product>) -> Self {
        Self { items }
    }
}
