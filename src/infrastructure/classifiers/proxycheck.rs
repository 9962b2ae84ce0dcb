//! proxycheck.io reputation lookups.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::classifiers::{ClassifierError, Reputation, ReputationProvider};
use crate::domain::entities::Settings;

const PROVIDER: &str = "proxycheck";
const DEFAULT_BASE_URL: &str = "https://proxycheck.io/v2";

/// [`ReputationProvider`] for the proxycheck.io v2 API.
pub struct ProxyCheckProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyCheckProvider {
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
impl ReputationProvider for ProxyCheckProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn credentials(&self, settings: &Settings) -> Option<String> {
        let key = settings.proxy_check_api_key.trim();
        (settings.enable_proxy_check && !key.is_empty()).then(|| key.to_string())
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
            .get(format!("{}/{}", self.base_url, ip))
            .query(&[("vpn", "1"), ("asn", "1"), ("key", api_key)])
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        parse_response(ip, &body)
    }
}

fn request_error(message: String) -> ClassifierError {
    ClassifierError::Request {
        provider: PROVIDER,
        message,
    }
}

/// Maps a v2 response body, keyed by the queried address, to a [`Reputation`].
///
/// `status` must be `ok` or `warning`. A `type` of VPN or TOR sets the
/// matching flag; SOCKS and HTTP variants mark a proxy.
pub(crate) fn parse_response(ip: &str, body: &Value) -> Result<Reputation, ClassifierError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
    if status != "ok" && status != "warning" {
        return Err(ClassifierError::Rejected {
            provider: PROVIDER,
            message: format!("status {status:?}"),
        });
    }

    let data = body
        .get(ip)
        .and_then(Value::as_object)
        .ok_or_else(|| ClassifierError::NoData {
            provider: PROVIDER,
            ip: ip.to_string(),
        })?;

    let mut reputation = Reputation {
        is_proxy: data.get("proxy").and_then(Value::as_str) == Some("yes"),
        country_code: data
            .get("isocode")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        risk_score: data
            .get("risk")
            .and_then(Value::as_f64)
            .map(|r| r as i32)
            .unwrap_or_default(),
        provider: PROVIDER.to_string(),
        ..Reputation::default()
    };

    match data.get("type").and_then(Value::as_str) {
        Some("VPN") => reputation.is_vpn = true,
        Some("TOR") => reputation.is_tor = true,
        Some("SOCKS" | "SOCKS4" | "SOCKS5" | "HTTP" | "HTTPS") => reputation.is_proxy = true,
        _ => {}
    }

    Ok(reputation)
}
