//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Duration;

use crate::cache::{FsStore, Value};
use crate::error::{CacheError, Result};
use crate::models::{
    CounterRequest, DeleteResponse, FlushResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse,
};

/// Application state shared across all handlers.
///
/// The store itself needs no lock; the RwLock only serializes this
/// process's mutations so increment/decrement cannot lose updates to each
/// other. Other processes sharing the root are not covered.
///
/// Store calls block on filesystem I/O, so handlers run them through
/// [`run_blocking`] while holding an owned guard.
#[derive(Clone)]
pub struct AppState {
    /// Filesystem cache store
    pub cache: Arc<RwLock<FsStore>>,
    /// TTL in seconds applied when a set request omits one
    pub default_ttl: i64,
}

impl AppState {
    /// Creates a new AppState with the given store and default TTL.
    pub fn new(cache: FsStore, default_ttl: i64) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            default_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the cache root cannot be created.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let cache = FsStore::new(&config.cache_dir)?;
        Ok(Self::new(cache, config.default_ttl))
    }
}

/// Runs a blocking store call on tokio's blocking pool.
async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Internal(format!("blocking store task failed: {}", e)))?
}

/// Handler for PUT /set
///
/// Stores a JSON value under a key with optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl_secs = req.ttl.unwrap_or(state.default_ttl);
    let ttl = Duration::try_seconds(ttl_secs)
        .ok_or_else(|| CacheError::InvalidRequest(format!("TTL of {ttl_secs}s is out of range")))?;

    let cache = state.cache.clone().write_owned().await;
    let key = req.key.clone();
    let value = Value::from(req.value);
    run_blocking(move || cache.set(&key, value, ttl)).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value by key. Expired items are collected and reported as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let cache = state.cache.clone().read_owned().await;
    let lookup = key.clone();
    let value = run_blocking(move || cache.get(&lookup)).await?;

    Ok(Json(GetResponse::new(key, value.to_json())))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key. Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let cache = state.cache.clone().write_owned().await;
    let target = key.clone();
    run_blocking(move || cache.delete(&target)).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /incr/:key
///
/// Adds `steps` (default 1) to a numeric value and returns the result.
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<CounterRequest>>,
) -> Result<Json<GetResponse>> {
    let steps = body.map(|Json(req)| req).unwrap_or_default().steps;

    let cache = state.cache.clone().write_owned().await;
    let target = key.clone();
    let value = run_blocking(move || cache.increment(&target, steps)).await?;

    Ok(Json(GetResponse::new(key, value.to_json())))
}

/// Handler for POST /decr/:key
///
/// Subtracts `steps` (default 1) from a numeric value and returns the result.
pub async fn decr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<CounterRequest>>,
) -> Result<Json<GetResponse>> {
    let steps = body.map(|Json(req)| req).unwrap_or_default().steps;

    let cache = state.cache.clone().write_owned().await;
    let target = key.clone();
    let value = run_blocking(move || cache.decrement(&target, steps)).await?;

    Ok(Json(GetResponse::new(key, value.to_json())))
}

/// Handler for POST /flush
///
/// Removes every cached item.
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    let cache = state.cache.clone().write_owned().await;
    run_blocking(move || cache.flush()).await?;

    Ok(Json(FlushResponse::flushed()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache.read().await;
    Json(HealthResponse::healthy(cache.root().display().to_string()))
}
