//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - L1 purge: drops expired in-process cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
