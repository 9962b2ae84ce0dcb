//! HTTP transport for webhook deliveries.

use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;
use tracing::debug;

use crate::application::services::webhook_dispatcher::{
    DeliveryError, TransportResponse, WebhookTransport,
};

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
pub const USER_AGENT: &str = "clickgate-webhook/1.0";

/// Largest response body kept for diagnostics.
const MAX_RESPONSE_BODY: usize = 1024 * 1024;

/// `reqwest`-backed [`WebhookTransport`] with a per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        signature: String,
    ) -> Result<TransportResponse, DeliveryError> {
        let mut response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status().as_u16();

        let mut collected = Vec::new();
        while collected.len() < MAX_RESPONSE_BODY {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    let room = MAX_RESPONSE_BODY - collected.len();
                    collected.extend_from_slice(&chunk[..chunk.len().min(room)]);
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Failed to read webhook response body: {}", e);
                    break;
                }
            }
        }

        Ok(TransportResponse {
            status,
            body: String::from_utf8_lossy(&collected).into_owned(),
        })
    }
}
