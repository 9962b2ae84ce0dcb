//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, rate limit store selection, classifier
//! wiring, webhook delivery, and Axum server lifecycle.

use crate::application::services::{
    Classifiers, EventNotifier, RateLimiter, ReputationChain, ResolverService, SettingsService,
    VariantService, WebhookDispatcher, WebhookNotifier,
};
use crate::config::Config;
use crate::domain::classifiers::{GeoLocator, ReputationProvider};
use crate::domain::clock::{Clock, SystemClock};
use crate::infrastructure::classifiers::{
    IpQualityScoreProvider, MaxMindLocator, ProxyCheckProvider, WootheeClassifier,
};
use crate::infrastructure::persistence::{
    PgClickRepository, PgLinkRepository, PgSettingsRepository, PgStatsRepository,
    PgWebhookRepository,
};
use crate::infrastructure::rate_limit::{MemoryWindowStore, RedisWindowStore, WindowStore};
use crate::infrastructure::webhook::HttpTransport;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis rate limit store (or process-local fallback)
/// - Visitor classifiers (user agent, IP reputation, optional GeoIP)
/// - Webhook notifier
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The GeoIP database cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store: Arc<dyn WindowStore> = if let Some(redis_url) = &config.redis_url {
        match RedisWindowStore::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Rate limit store: Redis");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory rate limits.",
                    e
                );
                Arc::new(MemoryWindowStore::new(clock.clone()))
            }
        }
    } else {
        tracing::info!("Rate limit store: in-memory");
        Arc::new(MemoryWindowStore::new(clock.clone()))
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let stats_repository = Arc::new(PgStatsRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));
    let webhook_repository = Arc::new(PgWebhookRepository::new(pool.clone()));
    let settings_repository = Arc::new(PgSettingsRepository::new(pool));

    let settings = Arc::new(SettingsService::new(
        settings_repository,
        config.settings_cache_ttl(),
    ));

    let classifiers = build_classifiers(&config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let transport = HttpTransport::new(config.webhook_timeout())
        .context("Failed to build webhook HTTP client")?;
    let dispatcher = Arc::new(WebhookDispatcher::new(Arc::new(transport)));
    let notifier: Arc<dyn EventNotifier> = Arc::new(WebhookNotifier::new(
        webhook_repository,
        dispatcher,
        clock.clone(),
        shutdown_rx,
    ));

    let resolver = Arc::new(ResolverService::new(
        link_repository.clone(),
        stats_repository,
        click_repository,
        settings.clone(),
        notifier.clone(),
        classifiers,
        clock.clone(),
    ));

    let state = AppState {
        resolver,
        variant_service: Arc::new(VariantService::new(link_repository)),
        rate_limiter: Arc::new(RateLimiter::new(store, clock.clone())),
        settings,
        notifier,
        clock,
        api_key: Arc::from(config.api_key.as_str()),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_tx))
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn build_classifiers(config: &Config) -> Result<Classifiers> {
    let timeout = config.reputation_timeout();

    // Later providers override earlier ones when both answer.
    let providers: Vec<Arc<dyn ReputationProvider>> = vec![
        Arc::new(ProxyCheckProvider::new(timeout).context("Failed to build ProxyCheck client")?),
        Arc::new(
            IpQualityScoreProvider::new(timeout)
                .context("Failed to build IPQualityScore client")?,
        ),
    ];

    let geo: Option<Arc<dyn GeoLocator>> = match &config.maxmind_db_path {
        Some(path) => {
            let locator = MaxMindLocator::open(path)
                .with_context(|| format!("Failed to open GeoIP database at {path}"))?;
            tracing::info!("GeoIP enabled ({})", path);
            Some(Arc::new(locator))
        }
        None => {
            tracing::info!("GeoIP disabled");
            None
        }
    };

    Ok(Classifiers {
        user_agent: Arc::new(WootheeClassifier::new()),
        reputation: ReputationChain::new(providers),
        geo,
    })
}

/// Waits for Ctrl+C, then tells background webhook deliveries to stop
/// waiting on retries.
async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown.send(true);
}
