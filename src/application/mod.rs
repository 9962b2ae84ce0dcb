//! Application layer services implementing business logic.
//!
//! Services consume repository and classifier traits and provide a clean API
//! for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::ResolverService`] - The click resolution pipeline
//! - [`services::RateLimiter`] - Sliding-window admission control
//! - [`services::VariantService`] - A/B conversion tracking
//! - [`services::SettingsService`] - TTL-cached global policy
//! - [`services::WebhookDispatcher`] / [`services::WebhookNotifier`] - Signed,
//!   retried webhook deliveries

pub mod services;
