//! Process-local sliding windows.

use super::store::{RateLimitResult, WindowSnapshot, WindowStore};
use crate::domain::clock::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Expired windows are swept once every this many `record` calls.
const SWEEP_EVERY: u64 = 256;

struct Window {
    hits: VecDeque<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

/// Window store held in process memory.
///
/// Used when Redis is not configured. Limits are then enforced per process
/// rather than across the fleet. Windows past their expiry are dropped by a
/// periodic sweep on the write path.
pub struct MemoryWindowStore {
    clock: Arc<dyn Clock>,
    windows: DashMap<String, Window>,
    records: AtomicU64,
}

impl MemoryWindowStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        debug!("Using in-memory rate limit windows");
        Self {
            clock,
            windows: DashMap::new(),
            records: AtomicU64::new(0),
        }
    }

    fn sweep(&self, now: DateTime<Utc>) {
        let before = self.windows.len();
        self.windows.retain(|_, w| w.expires_at > now);
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted, "Evicted expired rate limit windows");
        }
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> RateLimitResult<u64> {
        if self.records.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == 0 {
            self.sweep(now);
        }

        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::days(365));
        let window_start = now - window;

        let mut entry = self.windows.entry(key.to_string()).or_insert_with(|| Window {
            hits: VecDeque::new(),
            expires_at: now,
        });

        while entry.hits.front().is_some_and(|hit| *hit <= window_start) {
            entry.hits.pop_front();
        }
        entry.hits.push_back(now);
        entry.expires_at = now + window;

        Ok(entry.hits.len() as u64)
    }

    async fn reset(&self, key: &str) -> RateLimitResult<()> {
        self.windows.remove(key);
        Ok(())
    }

    async fn snapshot(&self) -> RateLimitResult<Vec<WindowSnapshot>> {
        let now = self.clock.now();
        self.sweep(now);

        let mut snapshots: Vec<WindowSnapshot> = self
            .windows
            .iter()
            .filter(|w| !w.hits.is_empty())
            .map(|w| WindowSnapshot {
                key: w.key().clone(),
                count: w.hits.len() as u64,
                ttl: (w.expires_at - now).to_std().unwrap_or_default(),
            })
            .collect();
        snapshots.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(snapshots)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;

    #[tokio::test]
    async fn test_window_trims_old_entries() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryWindowStore::new(clock.clone());
        let window = Duration::from_secs(10);

        assert_eq!(store.record("k", clock.now(), window).await.unwrap(), 1);
        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(store.record("k", clock.now(), window).await.unwrap(), 2);
        clock.advance(chrono::Duration::seconds(6));
        assert_eq!(store.record("k", clock.now(), window).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_skips_expired_windows() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryWindowStore::new(clock.clone());

        store
            .record("short", clock.now(), Duration::from_secs(5))
            .await
            .unwrap();
        store
            .record("long", clock.now(), Duration::from_secs(60))
            .await
            .unwrap();
        clock.advance(chrono::Duration::seconds(10));

        let snapshots = store.snapshot().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].key, "long");
        assert_eq!(snapshots[0].count, 1);
        assert_eq!(snapshots[0].ttl, Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_reset_clears_window() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryWindowStore::new(clock.clone());
        let window = Duration::from_secs(60);

        store.record("k", clock.now(), window).await.unwrap();
        store.record("k", clock.now(), window).await.unwrap();
        store.reset("k").await.unwrap();

        assert_eq!(store.record("k", clock.now(), window).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_windows_are_evicted_on_record() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryWindowStore::new(clock.clone());
        let window = Duration::from_secs(1);

        for i in 0..10_000 {
            store
                .record(&format!("ip:10.0.{}.{}", i / 256, i % 256), clock.now(), window)
                .await
                .unwrap();
            clock.advance(chrono::Duration::seconds(2));
        }

        assert!(store.windows.len() <= SWEEP_EVERY as usize);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_windows() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryWindowStore::new(clock.clone());

        store
            .record("ip:live", clock.now(), Duration::from_secs(3600))
            .await
            .unwrap();
        for i in 0..SWEEP_EVERY * 2 {
            store
                .record(&format!("ip:{i}"), clock.now(), Duration::from_secs(1))
                .await
                .unwrap();
            clock.advance(chrono::Duration::seconds(2));
        }

        assert_eq!(
            store
                .record("ip:live", clock.now(), Duration::from_secs(3600))
                .await
                .unwrap(),
            2
        );
    }
}
