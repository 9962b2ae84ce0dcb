//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    EventNotifier, RateLimiter, ResolverService, SettingsService, VariantService,
};
use crate::domain::clock::Clock;

/// Services and configuration shared across requests.
///
/// Cloning is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverService>,
    pub variant_service: Arc<VariantService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub settings: Arc<SettingsService>,
    pub notifier: Arc<dyn EventNotifier>,
    pub clock: Arc<dyn Clock>,
    /// Expected value of the `X-Api-Key` header.
    pub api_key: Arc<str>,
}
