//! Sliding-window store trait and error types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the counter store.
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("counter store error: {0}")]
    Store(#[from] redis::RedisError),
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for window store operations.
pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Live state of one tracked key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Key as passed to [`WindowStore::record`], without any store namespace.
    pub key: String,
    pub count: u64,
    pub ttl: Duration,
}

/// Shared storage for sliding-window request logs.
///
/// # Implementations
///
/// - [`crate::infrastructure::rate_limit::RedisWindowStore`] - Sorted sets in Redis
/// - [`crate::infrastructure::rate_limit::MemoryWindowStore`] - Process-local fallback
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Trims entries older than `now - window`, records `now`, refreshes the
    /// key expiry and returns the number of entries left in the window.
    ///
    /// The four steps run as one atomic round trip.
    async fn record(&self, key: &str, now: DateTime<Utc>, window: Duration)
    -> RateLimitResult<u64>;

    /// Drops the key's window.
    async fn reset(&self, key: &str) -> RateLimitResult<()>;

    /// Lists every tracked key with a non-empty, unexpired window.
    ///
    /// Keys that vanish while the scan is running are skipped.
    async fn snapshot(&self) -> RateLimitResult<Vec<WindowSnapshot>>;

    /// Checks store connectivity.
    async fn health_check(&self) -> bool;
}
