//! Visitor classification contracts.
//!
//! Every classifier is optional from the pipeline's point of view. Reputation
//! and geolocation failures are swallowed by the caller and leave the
//! corresponding attributes empty.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Settings;

/// Attributes derived from a `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub os: String,
    pub device: String,
    pub browser: String,
    pub is_bot: bool,
    pub bot_type: String,
}

/// Derives OS, device class, browser and bot attributes from a user agent.
#[cfg_attr(test, mockall::automock)]
pub trait UserAgentClassifier: Send + Sync {
    fn classify(&self, user_agent: &str) -> UserAgentInfo;
}

/// Risk attributes reported by an IP reputation provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reputation {
    pub is_vpn: bool,
    pub is_tor: bool,
    pub is_proxy: bool,
    pub is_bot: bool,
    pub fraud_score: i32,
    pub risk_score: i32,
    pub country_code: String,
    pub provider: String,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} rejected the lookup: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned no data for {ip}")]
    NoData { provider: &'static str, ip: String },
}

/// One link of the reputation override chain.
///
/// A provider takes part in a lookup only when
/// [`credentials`](ReputationProvider::credentials) yields a key for the
/// current settings.
#[async_trait]
pub trait ReputationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// API key to use when the provider is enabled in `settings`.
    fn credentials(&self, settings: &Settings) -> Option<String>;

    async fn check(&self, ip: &str, api_key: &str) -> Result<Reputation, ClassifierError>;
}

/// Country and city resolved from an IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    pub country_code: String,
    pub city: String,
}

/// Offline IP geolocation.
#[cfg_attr(test, mockall::automock)]
pub trait GeoLocator: Send + Sync {
    fn locate(&self, ip: &str) -> Option<GeoLocation>;
}
