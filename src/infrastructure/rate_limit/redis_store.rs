//! Redis-backed sliding windows.

use super::store::{RateLimitError, RateLimitResult, WindowSnapshot, WindowStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "ratelimit:";
const SCAN_BATCH: u32 = 100;

/// Sliding windows kept as Redis sorted sets scored by microsecond timestamps.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Each window operation is a single `MULTI`/`EXEC` pipeline.
pub struct RedisWindowStore {
    client: ConnectionManager,
}

impl RedisWindowStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Unavailable`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> RateLimitResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            RateLimitError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RateLimitError::Unavailable(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| RateLimitError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }

    fn build_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> RateLimitResult<u64> {
        let redis_key = Self::build_key(key);
        let mut conn = self.client.clone();

        let now_us = now.timestamp_micros();
        let window_us = i64::try_from(window.as_micros()).unwrap_or(i64::MAX);
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let window_start = now_us.saturating_sub(window_us);
        // Unique member so concurrent hits in the same microsecond are all counted.
        let member = format!("{}-{:016x}", now_us, rand::random::<u64>());

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .zrembyscore(&redis_key, 0, window_start)
            .ignore()
            .zadd(&redis_key, member, now_us)
            .ignore()
            .zcard(&redis_key)
            .pexpire(&redis_key, window_ms)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(key, count, "Rate window updated");
        Ok(count)
    }

    async fn reset(&self, key: &str) -> RateLimitResult<()> {
        let mut conn = self.client.clone();
        let deleted: i64 = conn.del(Self::build_key(key)).await?;
        debug!(key, deleted, "Rate window reset");
        Ok(())
    }

    async fn snapshot(&self) -> RateLimitResult<Vec<WindowSnapshot>> {
        let mut conn = self.client.clone();
        let pattern = format!("{}*", KEY_PREFIX);
        let mut cursor: u64 = 0;
        let mut snapshots = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            for redis_key in keys {
                let result: redis::RedisResult<(u64, i64)> = redis::pipe()
                    .zcard(&redis_key)
                    .pttl(&redis_key)
                    .query_async(&mut conn)
                    .await;

                let (count, ttl_ms) = match result {
                    Ok(values) => values,
                    Err(e) => {
                        warn!("Skipping rate window {}: {}", redis_key, e);
                        continue;
                    }
                };

                // -2: key expired between SCAN and lookup.
                if count == 0 || ttl_ms == -2 {
                    continue;
                }

                snapshots.push(WindowSnapshot {
                    key: redis_key
                        .strip_prefix(KEY_PREFIX)
                        .unwrap_or(&redis_key)
                        .to_string(),
                    count,
                    ttl: Duration::from_millis(ttl_ms.max(0) as u64),
                });
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(snapshots)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
