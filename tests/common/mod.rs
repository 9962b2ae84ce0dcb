#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::connect_info::MockConnectInfo;
use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clickgate::api::handlers::health_handler;
use clickgate::api::routes::protected_routes;
use clickgate::application::services::{
    Classifiers, EventNotifier, RateLimiter, ReputationChain, ResolverService, SettingsService,
    VariantService,
};
use clickgate::domain::clock::{Clock, ManualClock};
use clickgate::domain::entities::{
    ClickEvent, Link, LinkStat, LinkVariant, Settings, WebhookEvent,
};
use clickgate::domain::repositories::{
    ClickRepository, LinkRepository, SettingsRepository, StatsRepository,
};
use clickgate::error::AppError;
use clickgate::infrastructure::classifiers::WootheeClassifier;
use clickgate::infrastructure::rate_limit::MemoryWindowStore;
use clickgate::state::AppState;

pub const API_KEY: &str = "test-api-key";
pub const PEER: &str = "198.51.100.20:40000";
pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct InMemoryLinks {
    pub links: Mutex<HashMap<String, Link>>,
    pub variants: Mutex<Vec<LinkVariant>>,
}

impl InMemoryLinks {
    pub fn insert(&self, link: Link) {
        self.links.lock().unwrap().insert(link.alias.clone(), link);
    }

    pub fn insert_variant(&self, variant: LinkVariant) {
        self.variants.lock().unwrap().push(variant);
    }

    pub fn variant(&self, id: &str) -> Option<LinkVariant> {
        self.variants
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.lock().unwrap().get(alias).cloned())
    }

    async fn list_variants(&self, alias: &str) -> Result<Vec<LinkVariant>, AppError> {
        Ok(self
            .variants
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.link_alias == alias)
            .cloned()
            .collect())
    }

    async fn find_variant(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<Option<LinkVariant>, AppError> {
        Ok(self
            .variants
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.link_alias == alias && v.id == variant_id)
            .cloned())
    }

    async fn increment_variant_clicks(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<(), AppError> {
        let mut variants = self.variants.lock().unwrap();
        if let Some(v) = variants
            .iter_mut()
            .find(|v| v.link_alias == alias && v.id == variant_id)
        {
            v.clicks += 1;
        }
        Ok(())
    }

    async fn increment_variant_conversions(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<bool, AppError> {
        let mut variants = self.variants.lock().unwrap();
        match variants
            .iter_mut()
            .find(|v| v.link_alias == alias && v.id == variant_id)
        {
            Some(v) => {
                v.conversions += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStats {
    pub hits: Mutex<HashMap<String, i64>>,
}

impl InMemoryStats {
    pub fn hits(&self, node_id: &str, alias: &str) -> i64 {
        LinkStat::key(node_id, alias)
            .and_then(|key| self.hits.lock().unwrap().get(&key).copied())
            .unwrap_or(0)
    }
}

#[async_trait]
impl StatsRepository for InMemoryStats {
    async fn get(&self, node_id: &str, alias: &str) -> Result<Option<LinkStat>, AppError> {
        let Some(key) = LinkStat::key(node_id, alias) else {
            return Ok(None);
        };

        Ok(self.hits.lock().unwrap().get(&key).map(|&hit_count| LinkStat {
            id: key.clone(),
            node_id: node_id.to_string(),
            alias: alias.to_string(),
            hit_count,
            last_hit_at: now(),
        }))
    }

    async fn increment_hit(&self, node_id: &str, alias: &str) -> Result<(), AppError> {
        if let Some(key) = LinkStat::key(node_id, alias) {
            *self.hits.lock().unwrap().entry(key).or_insert(0) += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClicks {
    pub events: Mutex<Vec<ClickEvent>>,
}

impl InMemoryClicks {
    pub fn all(&self) -> Vec<ClickEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClicks {
    async fn log_click(&self, event: ClickEvent) -> Result<(), AppError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Settings registry that never fails, or always fails when `broken`.
pub struct StaticSettings {
    pub settings: Settings,
    pub broken: bool,
}

#[async_trait]
impl SettingsRepository for StaticSettings {
    async fn load(&self) -> Result<Option<Settings>, AppError> {
        if self.broken {
            return Err(AppError::internal("Database error", serde_json::json!({})));
        }
        Ok(Some(self.settings.clone()))
    }
}

/// Notifier that keeps every event instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(WebhookEvent, Map<String, Value>)>>,
}

impl RecordingNotifier {
    pub fn of(&self, event: WebhookEvent) -> Vec<Map<String, Value>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

impl EventNotifier for RecordingNotifier {
    fn notify(&self, event: WebhookEvent, data: Map<String, Value>) {
        self.events.lock().unwrap().push((event, data));
    }
}

pub struct TestApp {
    pub state: AppState,
    pub links: Arc<InMemoryLinks>,
    pub stats: Arc<InMemoryStats>,
    pub clicks: Arc<InMemoryClicks>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::build(StaticSettings {
            settings,
            broken: false,
        })
    }

    pub fn with_broken_database() -> Self {
        Self::build(StaticSettings {
            settings: Settings::default(),
            broken: true,
        })
    }

    fn build(settings_repository: StaticSettings) -> Self {
        let links = Arc::new(InMemoryLinks::default());
        let stats = Arc::new(InMemoryStats::default());
        let clicks = Arc::new(InMemoryClicks::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(now()));
        let clock_dyn: Arc<dyn Clock> = clock.clone();

        let settings = Arc::new(SettingsService::new(
            Arc::new(settings_repository),
            Duration::from_secs(30),
        ));

        let classifiers = Classifiers {
            user_agent: Arc::new(WootheeClassifier::new()),
            reputation: ReputationChain::default(),
            geo: None,
        };

        let resolver = Arc::new(ResolverService::new(
            links.clone(),
            stats.clone(),
            clicks.clone(),
            settings.clone(),
            notifier.clone(),
            classifiers,
            clock_dyn.clone(),
        ));

        let store = Arc::new(MemoryWindowStore::new(clock_dyn.clone()));

        let state = AppState {
            resolver,
            variant_service: Arc::new(VariantService::new(links.clone())),
            rate_limiter: Arc::new(RateLimiter::new(store, clock_dyn.clone())),
            settings,
            notifier: notifier.clone(),
            clock: clock_dyn,
            api_key: Arc::from(API_KEY),
        };

        Self {
            state,
            links,
            stats,
            clicks,
            notifier,
            clock,
        }
    }

    /// Serves the full route table with a fixed peer address.
    pub fn server(&self) -> TestServer {
        let peer: SocketAddr = PEER.parse().unwrap();

        let app = Router::new()
            .route("/health", get(health_handler))
            .merge(protected_routes(self.state.clone()))
            .layer(MockConnectInfo(peer))
            .with_state(self.state.clone());

        TestServer::new(app).unwrap()
    }
}

pub fn link(alias: &str, target: &str) -> Link {
    Link::new(format!("link-{alias}"), alias, target)
}
