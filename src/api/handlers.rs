//! API Handlers
//!
//! HTTP request handlers for the product and cache endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tokio_util::sync::CancellationToken;

use crate::cache::{
    BackendError, CacheBackend, DistributedCache, LocalCaches, MemoryBackend, RedisBackend,
};
use crate::config::{BackendKind, Config};
use crate::error::{CatalogError, Result};
use crate::models::{
    HealthResponse, LocalCacheResponse, LocalEntryResponse, Product, ProductId, ProductRequest,
    StatsResponse,
};
use crate::repository::ProductRepository;
use crate::service::{CacheAdmin, ProductService};

/// Application state shared across all handlers.
///
/// Built once at startup; every handler gets a cheap clone that shares the
/// same cache tiers and store.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside product operations
    pub products: Arc<ProductService>,
    /// Cache inspection and flushing
    pub admin: Arc<CacheAdmin>,
    /// L1 caches, shared with the background purge task
    pub local: LocalCaches,
    /// Cancelled on shutdown; every request works on a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wires the service over the given store and L2 transport.
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        backend: Arc<dyn CacheBackend>,
        config: &Config,
    ) -> Self {
        let distributed = Arc::new(DistributedCache::from_config(backend, config));
        let local = LocalCaches::from_config(config);

        Self {
            products: Arc::new(ProductService::new(
                repository,
                distributed.clone(),
                local.clone(),
            )),
            admin: Arc::new(CacheAdmin::new(distributed, local.clone())),
            local,
            shutdown: CancellationToken::new(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The Redis connection is not opened here; it is established on first
    /// use.
    pub fn from_config(
        config: &Config,
        repository: Arc<dyn ProductRepository>,
    ) -> std::result::Result<Self, BackendError> {
        let backend: Arc<dyn CacheBackend> = match config.cache_backend {
            BackendKind::Redis => Arc::new(RedisBackend::new(&config.redis_url)?),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        Ok(Self::new(repository, backend, config))
    }

    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| CatalogError::NotFound(raw.to_string()))
}

/// Unpacks and validates a product body.
///
/// A body that is not valid JSON for a product (missing `name`, a
/// non-numeric `price`, wrong content type) is a 400 like any other
/// validation failure.
fn validated(
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<ProductRequest> {
    let Json(req) =
        payload.map_err(|rejection| CatalogError::InvalidRequest(rejection.body_text()))?;
    match req.validate() {
        Some(error_msg) => Err(CatalogError::InvalidRequest(error_msg)),
        None => Ok(req),
    }
}

/// Handler for GET /api/products
pub async fn list_products_handler(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.products.get_all(&state.request_token()).await?;
    Ok(Json(products))
}

/// Handler for GET /api/products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product_id = parse_id(&id)?;
    state
        .products
        .get_by_id(product_id, &state.request_token())
        .await?
        .map(Json)
        .ok_or(CatalogError::NotFound(id))
}

/// Handler for POST /api/products
///
/// Responds 201 with the stored product and its location.
pub async fn create_product_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let product = validated(payload)?.into_product();
    let created = state
        .products
        .create(product, &state.request_token())
        .await?;

    let location = format!("/api/products/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// Handler for PUT /api/products/:id
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let product_id = parse_id(&id)?;
    let product = validated(payload)?.into_product_with_id(product_id);

    if state
        .products
        .update(product_id, product, &state.request_token())
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CatalogError::NotFound(id))
    }
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let product_id = parse_id(&id)?;

    if state
        .products
        .delete(product_id, &state.request_token())
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CatalogError::NotFound(id))
    }
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.admin.statistics(&state.request_token()).await;
    Json(StatsResponse::from(stats))
}

/// Handler for DELETE /api/cache/clear
pub async fn cache_clear_handler(State(state): State<AppState>) -> StatusCode {
    state.admin.clear(&state.request_token()).await;
    StatusCode::NO_CONTENT
}

/// Handler for GET /api/cache/local
pub async fn local_cache_handler(State(state): State<AppState>) -> Json<LocalCacheResponse> {
    Json(LocalCacheResponse {
        products: state.admin.local_count(),
        all_products: state.admin.local_has_all_products(),
    })
}

/// Handler for GET /api/cache/local/:id
pub async fn local_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocalEntryResponse>> {
    let product_id = parse_id(&id)?;
    Ok(Json(LocalEntryResponse {
        cached: state.admin.local_contains(product_id),
        id: product_id.to_string(),
    }))
}

/// Handler for DELETE /api/cache/local/:id
pub async fn local_evict_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let product_id = parse_id(&id)?;
    state.admin.local_evict(product_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /health
///
/// The service answers without L2, so an unreachable cache reports
/// "degraded" with a 200.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_availability(
        state.admin.is_available().await,
    ))
}

/// Handler for GET /health/redis
///
/// 503 when the distributed cache is unreachable.
pub async fn cache_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let available = state.admin.is_available().await;
    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::from_availability(available)))
}
