//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which transport backs the distributed (L2) cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Shared Redis server
    Redis,
    /// In-process stand-in, useful for local runs without Redis
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection URL
    pub redis_url: String,
    /// Transport used for the L2 cache
    pub cache_backend: BackendKind,
    /// Namespace prepended to every L2 key
    pub key_prefix: String,
    /// Default L2 TTL in seconds
    pub default_ttl: u64,
    /// L1 TTL for single product entries, in seconds
    pub product_ttl: u64,
    /// L1 TTL for the all-products entry, in seconds
    pub all_products_ttl: u64,
    /// Background L1 purge interval in seconds
    pub cleanup_interval: u64,
    /// Seed demo products into an empty store at startup
    pub seed_data: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `CACHE_KEY_PREFIX` - L2 key namespace (default: rcw:)
    /// - `CACHE_DEFAULT_TTL` - L2 TTL in seconds (default: 300)
    /// - `PRODUCT_CACHE_TTL` - L1 product TTL in seconds (default: 120)
    /// - `ALL_PRODUCTS_CACHE_TTL` - L1 list TTL in seconds (default: 30)
    /// - `CLEANUP_INTERVAL` - L1 purge frequency in seconds (default: 1)
    /// - `SEED_DATA` - seed demo products (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            product_ttl: parse_var("PRODUCT_CACHE_TTL").unwrap_or(defaults.product_ttl),
            all_products_ttl: parse_var("ALL_PRODUCTS_CACHE_TTL")
                .unwrap_or(defaults.all_products_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            seed_data: parse_var("SEED_DATA").unwrap_or(defaults.seed_data),
        }
    }

    /// Default L2 TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// L1 product TTL as a Duration.
    pub fn product_ttl(&self) -> Duration {
        Duration::from_secs(self.product_ttl)
    }

    /// L1 all-products TTL as a Duration.
    pub fn all_products_ttl(&self) -> Duration {
        Duration::from_secs(self.all_products_ttl)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_backend: BackendKind::Redis,
            key_prefix: "rcw:".to_string(),
            default_ttl: 300,
            product_ttl: 120,
            all_products_ttl: 30,
            cleanup_interval: 1,
            seed_data: true,
        }
    }
}
