//! IPQualityScore proxy and VPN detection.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::classifiers::{ClassifierError, Reputation, ReputationProvider};
use crate::domain::entities::Settings;

const PROVIDER: &str = "ipqualityscore";
const DEFAULT_BASE_URL: &str = "https://ipqualityscore.com/api/json/ip";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpqsResponse {
    success: bool,
    message: String,
    fraud_score: i32,
    country_code: String,
    proxy: bool,
    vpn: bool,
    tor: bool,
    bot_status: bool,
    active_vpn: bool,
    active_tor: bool,
}

impl IpqsResponse {
    fn into_reputation(self) -> Result<Reputation, ClassifierError> {
        if !self.success {
            return Err(ClassifierError::Rejected {
                provider: PROVIDER,
                message: self.message,
            });
        }

        Ok(Reputation {
            is_vpn: self.vpn || self.active_vpn,
            is_tor: self.tor || self.active_tor,
            is_proxy: self.proxy || self.vpn || self.active_vpn,
            is_bot: self.bot_status,
            fraud_score: self.fraud_score,
            risk_score: 0,
            country_code: self.country_code,
            provider: PROVIDER.to_string(),
        })
    }
}

/// [`ReputationProvider`] for the IPQualityScore JSON API.
///
/// Reports bot status in addition to proxy flags, so it is the only provider
/// that can trigger the global bot block.
pub struct IpQualityScoreProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpQualityScoreProvider {
    pub fn new(timeout: Duration) -> Result<Self, ClassifierError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| request_error(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReputationProvider for IpQualityScoreProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn credentials(&self, settings: &Settings) -> Option<String> {
        let key = settings.ip_quality_score_api_key.trim();
        (settings.enable_ip_quality_score && !key.is_empty()).then(|| key.to_string())
    }

    async fn check(&self, ip: &str, api_key: &str) -> Result<Reputation, ClassifierError> {
        if ip.is_empty() {
            return Err(ClassifierError::NoData {
                provider: PROVIDER,
                ip: String::new(),
            });
        }

        let response = self
            .client
            .get(format!("{}/{}/{}", self.base_url, api_key, ip))
            .query(&[("strictness", "0"), ("allow_public_access_points", "true")])
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ClassifierError::Rejected {
                provider: PROVIDER,
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        response
            .json::<IpqsResponse>()
            .await
            .map_err(|e| request_error(e.to_string()))?
            .into_reputation()
    }
}

fn request_error(message: String) -> ClassifierError {
    ClassifierError::Request {
        provider: PROVIDER,
        message,
    }
}
