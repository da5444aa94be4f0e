//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `/api/products` - Product CRUD over the cache-aside service
//! - `/api/cache/*` - Cache statistics, flushing and L1 inspection
//! - `/health`, `/health/redis` - Health checks

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
