//! Disk Cache - A filesystem-backed cache store
//!
//! Persists values under string keys in a digest-addressed directory tree,
//! with lazy TTL expiration and numeric increment/decrement.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheItem, FsStore, Value};
pub use config::Config;
pub use error::{CacheError, Result};
