//! Service Module
//!
//! - `ProductService`: the cache-aside read/write protocol
//! - `CacheAdmin`: statistics, availability and manual flushing

mod admin;
mod products;

pub use admin::CacheAdmin;
pub use products::ProductService;
