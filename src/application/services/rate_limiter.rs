//! Sliding-window rate limiting service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::clock::Clock;
use crate::infrastructure::rate_limit::{RateLimitResult, WindowStore};

/// Outcome of one [`RateLimiter::allow`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, at least one.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.reset_at - now).num_seconds().max(1)
    }
}

/// A tracked key as reported to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub key: String,
    pub count: u64,
    pub expires_at: DateTime<Utc>,
}

/// Sliding-window admission control over a shared [`WindowStore`].
///
/// Keys are free-form (`ip:<addr>`, `link:<alias>`). Store failures never
/// block traffic: the limiter logs them and admits the request.
pub struct RateLimiter {
    store: Arc<dyn WindowStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn WindowStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records one request for `key` and decides whether it fits in the window.
    ///
    /// `allowed` is `count <= limit`, `remaining` is `limit - count` floored at
    /// zero, and the window resets `window` after now.
    pub async fn allow(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = self.clock.now();
        let reset_at = now + chrono::Duration::from_std(window).unwrap_or(chrono::Duration::zero());

        let decision = match self.store.record(key, now, window).await {
            Ok(count) => {
                let limit_u64 = u64::from(limit);
                RateLimitDecision {
                    allowed: count <= limit_u64,
                    limit,
                    remaining: limit_u64.saturating_sub(count) as u32,
                    reset_at,
                }
            }
            Err(e) => {
                warn!(key, "Rate limit store failed, allowing request: {}", e);
                RateLimitDecision {
                    allowed: true,
                    limit,
                    remaining: limit,
                    reset_at,
                }
            }
        };

        debug!(
            key,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "Rate limit decision"
        );
        metrics::counter!(
            "clickgate_rate_limit_decisions_total",
            "allowed" => if decision.allowed { "true" } else { "false" }
        )
        .increment(1);

        decision
    }

    /// Clears a key's window.
    ///
    /// # Errors
    ///
    /// Returns the store error; administrative calls are not failed open.
    pub async fn reset(&self, key: &str) -> RateLimitResult<()> {
        self.store.reset(key).await
    }

    /// Lists tracked keys with their live count and expiry.
    pub async fn list(&self) -> RateLimitResult<Vec<RateLimitInfo>> {
        let now = self.clock.now();
        let snapshots = self.store.snapshot().await?;

        Ok(snapshots
            .into_iter()
            .map(|s| RateLimitInfo {
                key: s.key,
                count: s.count,
                expires_at: now
                    + chrono::Duration::from_std(s.ttl).unwrap_or(chrono::Duration::zero()),
            })
            .collect())
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::infrastructure::rate_limit::{
        MemoryWindowStore, RateLimitError, WindowSnapshot,
    };
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl WindowStore for BrokenStore {
        async fn record(&self, _: &str, _: DateTime<Utc>, _: Duration) -> RateLimitResult<u64> {
            Err(RateLimitError::Unavailable("connection refused".to_string()))
        }
        async fn reset(&self, _: &str) -> RateLimitResult<()> {
            Err(RateLimitError::Unavailable("connection refused".to_string()))
        }
        async fn snapshot(&self) -> RateLimitResult<Vec<WindowSnapshot>> {
            Err(RateLimitError::Unavailable("connection refused".to_string()))
        }
        async fn health_check(&self) -> bool {
            false
        }
    }

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryWindowStore::new(clock.clone()));
        (RateLimiter::new(store, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_sixth_call_in_window_is_rejected() {
        let (limiter, clock) = limiter();
        let window = Duration::from_secs(60);

        for expected_remaining in [4, 3, 2, 1, 0] {
            let decision = limiter.allow("ip:1.2.3.4", 5, window).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
            assert_eq!(decision.limit, 5);
            assert_eq!(decision.reset_at, clock.now() + chrono::Duration::seconds(60));
        }

        let decision = limiter.allow("ip:1.2.3.4", 5, window).await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_window_elapses() {
        let (limiter, clock) = limiter();
        let window = Duration::from_secs(60);

        for _ in 0..6 {
            limiter.allow("ip:1.2.3.4", 5, window).await;
        }
        assert!(!limiter.allow("ip:1.2.3.4", 5, window).await.allowed);

        clock.advance(chrono::Duration::seconds(61));
        let decision = limiter.allow("ip:1.2.3.4", 5, window).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (limiter, _) = limiter();
        let window = Duration::from_secs(60);

        assert!(limiter.allow("ip:a", 1, window).await.allowed);
        assert!(!limiter.allow("ip:a", 1, window).await.allowed);
        assert!(limiter.allow("ip:b", 1, window).await.allowed);
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let limiter = RateLimiter::new(Arc::new(BrokenStore), clock);

        let decision = limiter.allow("ip:1.2.3.4", 5, Duration::from_secs(60)).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 5);
        assert!(limiter.list().await.is_err());
        assert!(limiter.reset("ip:1.2.3.4").await.is_err());
        assert!(!limiter.health_check().await);
    }

    #[tokio::test]
    async fn test_reset_and_list() {
        let (limiter, clock) = limiter();
        let window = Duration::from_secs(60);

        limiter.allow("ip:a", 10, window).await;
        limiter.allow("ip:a", 10, window).await;
        limiter.allow("link:promo", 10, window).await;

        let listed = limiter.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].key, "ip:a");
        assert_eq!(listed[0].count, 2);
        assert_eq!(listed[0].expires_at, clock.now() + chrono::Duration::seconds(60));

        limiter.reset("ip:a").await.unwrap();
        let listed = limiter.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "link:promo");
    }

    #[test]
    fn test_retry_after_is_at_least_one_second() {
        let now = Utc::now();
        let decision = RateLimitDecision {
            allowed: false,
            limit: 1,
            remaining: 0,
            reset_at: now,
        };
        assert_eq!(decision.retry_after_secs(now), 1);

        let decision = RateLimitDecision {
            reset_at: now + chrono::Duration::seconds(42),
            ..decision
        };
        assert_eq!(decision.retry_after_secs(now), 42);
    }
}
