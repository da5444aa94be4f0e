//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStatistics;

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// L2 keyspace hits
    pub hits: u64,
    /// L2 keyspace misses
    pub misses: u64,
    /// L2 evicted keys
    pub evictions: u64,
    /// Keys currently held by L2
    pub keys: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStatistics> for StatsResponse {
    fn from(stats: CacheStatistics) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            keys: stats.keys,
        }
    }
}

/// Response body for the L1 overview endpoint (GET /api/cache/local)
#[derive(Debug, Clone, Serialize)]
pub struct LocalCacheResponse {
    /// Live single-product entries
    pub products: usize,
    /// Whether the all-products list is cached
    pub all_products: bool,
}

/// Response body for the L1 entry endpoint (GET /api/cache/local/:id)
#[derive(Debug, Clone, Serialize)]
pub struct LocalEntryResponse {
    /// The product id that was checked
    pub id: String,
    /// Whether a live L1 entry exists
    pub cached: bool,
}

/// Response body for the health endpoints (GET /health, GET /health/redis)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" or "degraded")
    pub status: String,
    /// Distributed cache status ("available" or "unavailable")
    pub cache: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Builds a health report from the distributed cache availability.
    ///
    /// The service stays usable without L2, so an unreachable cache only
    /// degrades the status.
    pub fn from_availability(cache_available: bool) -> Self {
        let (status, cache) = if cache_available {
            ("healthy", "available")
        } else {
            ("degraded", "unavailable")
        };
        Self {
            status: status.to_string(),
            cache: cache.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
