//! Concrete visitor classifiers.
//!
//! - [`WootheeClassifier`] - user-agent parsing and bot detection
//! - [`ProxyCheckProvider`], [`IpQualityScoreProvider`] - IP reputation
//! - [`MaxMindLocator`] - offline country/city lookup

mod geoip;
mod ipqs;
mod proxycheck;
mod user_agent;

pub use geoip::MaxMindLocator;
pub use ipqs::IpQualityScoreProvider;
pub use proxycheck::ProxyCheckProvider;
pub use user_agent::WootheeClassifier;
