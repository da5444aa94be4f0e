//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies.

use bigdecimal::BigDecimal;
use serde::Deserialize;

use super::product::{Product, ProductId};

/// Request body for creating or replacing a product
/// (POST /api/products, PUT /api/products/:id)
///
/// The id and creation time are owned by the store and never taken from
/// the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    /// Product name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    pub price: BigDecimal,
    /// Product category
    #[serde(default)]
    pub category: String,
}

impl ProductRequest {
    /// Converts the request into a product with an unassigned id.
    pub fn into_product(self) -> Product {
        let mut product = Product::new(self.name, self.category, self.price);
        product.description = self.description;
        product
    }

    /// Converts the request into a product carrying the given id.
    pub fn into_product_with_id(self, id: ProductId) -> Product {
        self.into_product().with_id(id)
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        self.clone().into_product().validate()
    }
}
