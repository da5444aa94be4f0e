//! API Routes
//!
//! Configures the Axum router with the product, cache and health endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_health_handler, cache_stats_handler, create_product_handler,
    delete_product_handler, get_product_handler, health_handler, list_products_handler,
    local_cache_handler, local_entry_handler, local_evict_handler, update_product_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/products` - List all products (cached)
/// - `POST /api/products` - Create a product (invalidates cache)
/// - `GET /api/products/:id` - Get one product (cached)
/// - `PUT /api/products/:id` - Replace a product (invalidates cache)
/// - `DELETE /api/products/:id` - Delete a product (invalidates cache)
/// - `GET /api/cache/stats` - L2 statistics
/// - `DELETE /api/cache/clear` - Flush product entries from both tiers
/// - `GET /api/cache/local` - L1 overview
/// - `GET|DELETE /api/cache/local/:id` - Inspect or evict one L1 entry
/// - `GET /health`, `GET /health/redis` - Health checks
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route(
            "/api/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache/clear", delete(cache_clear_handler))
        .route("/api/cache/local", get(local_cache_handler))
        .route(
            "/api/cache/local/:id",
            get(local_entry_handler).delete(local_evict_handler),
        )
        .route("/health", get(health_handler))
        .route("/health/redis", get(cache_health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
