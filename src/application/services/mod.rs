//! Business logic services for the application layer.

pub mod rate_limiter;
pub mod reputation_chain;
pub mod resolver_service;
pub mod settings_service;
pub mod variant_service;
pub mod webhook_dispatcher;
pub mod webhook_notifier;

pub use rate_limiter::{RateLimitDecision, RateLimitInfo, RateLimiter};
pub use reputation_chain::ReputationChain;
pub use resolver_service::{Classifiers, Resolution, ResolverService};
pub use settings_service::SettingsService;
pub use variant_service::VariantService;
pub use webhook_dispatcher::{
    DeliveryError, DeliveryOutcome, DeliveryReport, TransportResponse, WebhookDispatcher,
    WebhookTransport,
};
pub use webhook_notifier::{EventNotifier, WebhookNotifier};
