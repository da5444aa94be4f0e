//! Demo catalog inserted into an empty store at startup.

use bigdecimal::BigDecimal;
use tracing::info;

use crate::error::Result;
use crate::models::Product;
use crate::repository::ProductRepository;

const SEED: &[(&str, &str, &str, &str)] = &[
    ("Laptop Pro 15", "Computers", "1999.99", "High-end laptop with 15-inch display"),
    ("Mechanical Keyboard", "Accessories", "129.99", "RGB mechanical keyboard"),
    ("Wireless Mouse", "Accessories", "49.99", "Ergonomic wireless mouse"),
    ("4K Monitor", "Monitors", "399.99", "27-inch 4K UHD monitor"),
    ("USB-C Hub", "Accessories", "59.99", "7-in-1 USB-C hub"),
    ("Noise Cancelling Headphones", "Audio", "299.99", "Over-ear ANC headphones"),
    ("Portable SSD 1TB", "Storage", "149.99", "High-speed NVMe SSD"),
    ("Smartphone XL", "Phones", "1099.00", "Flagship smartphone"),
    ("Tablet 11", "Tablets", "699.00", "11-inch tablet"),
    ("Gaming Chair", "Furniture", "249.99", "Ergonomic gaming chair"),
];

/// Inserts the demo products if the store is empty.
///
/// Returns how many products were inserted.
pub async fn seed_products(repository: &dyn ProductRepository) -> Result<usize> {
    if !repository.get_all().await?.is_empty() {
        return Ok(0);
    }

    for (name, category, price, description) in SEED {
        let price: BigDecimal = price.parse().unwrap_or_default();
        let product = Product::new(*name, *category, price).with_description(*description);
        repository.add(product).await?;
    }

    info!("Seeded {} demo products", SEED.len());
    Ok(SEED.len())
}
