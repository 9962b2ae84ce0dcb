//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Links, variants and variant counters
//! - [`PgStatsRepository`] - Per-node hit counters
//! - [`PgClickRepository`] - Click audit log
//! - [`PgWebhookRepository`] - Webhook subscribers
//! - [`PgSettingsRepository`] - Global admission policy

pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pg_settings_repository;
pub mod pg_stats_repository;
pub mod pg_webhook_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_settings_repository::PgSettingsRepository;
pub use pg_stats_repository::PgStatsRepository;
pub use pg_webhook_repository::PgWebhookRepository;
