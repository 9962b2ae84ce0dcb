//! Cached accessor for the global settings record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::entities::Settings;
use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;

struct CachedSettings {
    value: Settings,
    fetched_at: Instant,
}

/// Serves the current [`Settings`] from a TTL cache.
///
/// - Fresh cache: returned as-is.
/// - Stale cache: returned as-is while a single background refresh runs.
/// - Empty cache: loaded synchronously. A missing record caches the defaults;
///   a load error serves the defaults uncached, so the next call retries.
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
    ttl: Duration,
    cache: RwLock<Option<CachedSettings>>,
    refreshing: AtomicBool,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepository>, ttl: Duration) -> Self {
        Self {
            repository,
            ttl,
            cache: RwLock::new(None),
            refreshing: AtomicBool::new(false),
        }
    }

    pub async fn current(self: &Arc<Self>) -> Settings {
        let stale = {
            let cache = self.cache.read().await;
            match cache.as_ref() {
                Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                    return cached.value.clone();
                }
                Some(cached) => Some(cached.value.clone()),
                None => None,
            }
        };

        match stale {
            Some(value) => {
                self.spawn_refresh();
                value
            }
            None => match self.refresh().await {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to load settings, using defaults: {}", e);
                    Settings::default()
                }
            },
        }
    }

    /// Checks that the settings registry answers.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.load().await.map(|_| ())
    }

    async fn refresh(&self) -> Result<Settings, AppError> {
        let value = self.repository.load().await?.unwrap_or_else(|| {
            debug!("No settings record stored, using defaults");
            Settings::default()
        });

        *self.cache.write().await = Some(CachedSettings {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    fn spawn_refresh(self: &Arc<Self>) {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.refresh().await {
                warn!("Background settings refresh failed, keeping stale copy: {}", e);
            }
            service.refreshing.store(false, Ordering::Release);
        });
    }
}
