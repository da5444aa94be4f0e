//! Catalog Cache - a product catalog behind a two-tier cache
//!
//! Reads go through an in-process L1 cache and a shared Redis L2 cache
//! before reaching the product store; writes hit the store and invalidate
//! both tiers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
