//! Product catalog domain types
//!
//! The cached payload. Carries no cache logic of its own.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum product name length in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum product description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum product category length in characters
pub const MAX_CATEGORY_LENGTH: usize = 100;

// == Product Id ==
/// Opaque product identifier wrapping a random UUID.
///
/// `ProductId::default()` is the nil UUID. It is distinguishable through
/// [`ProductId::is_default`] and never identifies a stored product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the wrapped UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// True for the nil identifier.
    pub fn is_default(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for ProductId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

// == Product ==
/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    #[serde(default)]
    pub id: ProductId,
    /// Product name
    pub name: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, never negative
    pub price: BigDecimal,
    /// Product category
    #[serde(default)]
    pub category: String,
    /// Creation time
    #[serde(default = "Utc::now")]
    pub created_at_utc: DateTime<Utc>,
}

impl Product {
    /// Creates a product with an unassigned id, stamped with the current time.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: BigDecimal) -> Self {
        Self {
            id: ProductId::default(),
            name: name.into(),
            description: None,
            price,
            category: category.into(),
            created_at_utc: Utc::now(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    /// Checks the attribute bounds.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            ));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Some(format!(
                    "Description exceeds maximum length of {} characters",
                    MAX_DESCRIPTION_LENGTH
                ));
            }
        }
        if self.category.chars().count() > MAX_CATEGORY_LENGTH {
            return Some(format!(
                "Category exceeds maximum length of {} characters",
                MAX_CATEGORY_LENGTH
            ));
        }
        if self.price < BigDecimal::from(0) {
            return Some("Price cannot be negative".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_id_is_distinguishable() {
        assert!(ProductId::default().is_default());
        assert!(!ProductId::new().is_default());
        assert_ne!(ProductId::new(), ProductId::new());
    }

    #[test]
    fn test_id_parse_roundtrips_display() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<ProductId>().is_err());
        assert!("".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = ProductId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_product_json_shape() {
        let product = Product::new("Widget", "Tools", price("9.99")).with_id(ProductId::new());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["name"], "Widget");
        assert!(json.get("createdAtUtc").is_some());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_validate_valid_product() {
        let product = Product::new("Widget", "Tools", price("9.99")).with_description("A widget");
        assert!(product.validate().is_none());
    }

    #[test]
    fn test_validate_bounds() {
        let empty_name = Product::new("  ", "Tools", price("1"));
        assert!(empty_name.validate().is_some());

        let long_name = Product::new("x".repeat(MAX_NAME_LENGTH + 1), "Tools", price("1"));
        assert!(long_name.validate().is_some());

        let long_category = Product::new("Widget", "c".repeat(MAX_CATEGORY_LENGTH + 1), price("1"));
        assert!(long_category.validate().is_some());

        let long_description = Product::new("Widget", "Tools", price("1"))
            .with_description("d".repeat(MAX_DESCRIPTION_LENGTH + 1));
        assert!(long_description.validate().is_some());

        let negative = Product::new("Widget", "Tools", price("-0.01"));
        assert!(negative.validate().is_some());

        let free = Product::new("Widget", "Tools", price("0"));
        assert!(free.validate().is_none());
    }
}
