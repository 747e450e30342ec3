//! Cache Item Module
//!
//! Defines the unit persisted per key: a payload plus its expiration time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Value;
use crate::error::{CacheError, Result};

// == Cache Item ==
/// One stored entry. Exactly one item lives in each cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem {
    /// Point in time at or after which the item is invalid
    pub expires_at: DateTime<Utc>,
    /// The stored payload
    pub data: Value,
}

impl CacheItem {
    // == Constructor ==
    /// Creates an item expiring `ttl` from now.
    ///
    /// A zero or negative `ttl` yields an item that is already expired.
    /// Fails if the resulting timestamp is out of range.
    pub fn new(data: Value, ttl: Duration) -> Result<Self> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            CacheError::InvalidRequest(format!("TTL of {}s is out of range", ttl.num_seconds()))
        })?;

        Ok(Self { expires_at, data })
    }

    // == Is Expired ==
    /// Checks if the item has expired.
    ///
    /// Boundary condition: the item is expired once the current time is
    /// greater than or equal to `expires_at`.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Encoding ==
    /// Serializes the item to the on-disk byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        // serde_json would write NaN/inf as null, which then fails to decode
        if let Value::Float(n) = self.data {
            if !n.is_finite() {
                return Err(CacheError::Serialization(serde::ser::Error::custom(format!(
                    "cannot encode non-finite float {n}"
                ))));
            }
        }

        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes an item previously produced by [`CacheItem::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
