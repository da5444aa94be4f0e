//! Domain and transport models
//!
//! The product catalog types plus the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::{Product, ProductId};
pub use requests::ProductRequest;
pub use responses::{
    ErrorResponse, HealthResponse, LocalCacheResponse, LocalEntryResponse, StatsResponse,
};
