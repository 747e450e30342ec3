//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value; numbers keep their integer/float kind
/// - `ttl`: Optional TTL in seconds, may be zero or negative (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: serde_json::Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Request body for INCR/DECR (POST /incr/:key, POST /decr/:key)
#[derive(Debug, Clone, Deserialize)]
pub struct CounterRequest {
    /// Amount to add or subtract, defaults to 1
    #[serde(default = "default_steps")]
    pub steps: u64,
}

impl Default for CounterRequest {
    fn default() -> Self {
        Self {
            steps: default_steps(),
        }
    }
}

fn default_steps() -> u64 {
    1
}
