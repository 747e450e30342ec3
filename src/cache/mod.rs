//! Cache Module
//!
//! Provides a filesystem-backed cache with lazy TTL expiration.

mod item;
pub mod path;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use item::CacheItem;
pub use path::path_for;
pub use store::FsStore;
pub use value::Value;
