//! Repository trait definitions for the domain layer.
//!
//! These traits abstract every registry the resolution engine reads or
//! mutates. Concrete implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! by `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Links, variants and variant counters
//! - [`StatsRepository`] - Per-node hit counters
//! - [`ClickRepository`] - Click audit log
//! - [`WebhookRepository`] - Webhook subscribers
//! - [`SettingsRepository`] - Global admission policy

pub mod click_repository;
pub mod link_repository;
pub mod settings_repository;
pub mod stats_repository;
pub mod webhook_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;
pub use settings_repository::SettingsRepository;
pub use stats_repository::StatsRepository;
pub use webhook_repository::WebhookRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
#[cfg(test)]
pub use webhook_repository::MockWebhookRepository;
