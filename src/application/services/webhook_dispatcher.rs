//! Signed webhook delivery with bounded retries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use crate::domain::entities::{Webhook, WebhookPayload};
use crate::utils::signature;

/// Total attempts per delivery, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;

/// Raw reply from a subscriber endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("delivery cancelled after {} attempt(s)", .report.attempts.len())]
    Cancelled { report: DeliveryReport },
}

/// Sends one signed POST to a subscriber.
///
/// # Implementations
///
/// - [`crate::infrastructure::webhook::HttpTransport`] - `reqwest` client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        signature: String,
    ) -> Result<TransportResponse, DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The subscriber answered 2xx.
    Delivered,
    /// The subscriber answered 4xx; not retried.
    Rejected,
    /// Every attempt failed with a network error or a non-4xx status.
    Exhausted,
    /// The caller gave up while waiting to retry.
    Cancelled,
}

impl DeliveryOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Rejected => "rejected",
            DeliveryOutcome::Exhausted => "exhausted",
            DeliveryOutcome::Cancelled => "cancelled",
        }
    }
}

/// One POST and what came of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub number: u32,
    pub status: Option<u16>,
    pub error: Option<String>,
    /// Wait scheduled before the next attempt, if one followed.
    pub backoff: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    /// Status of the last attempt that got an HTTP answer.
    pub status: Option<u16>,
    pub response_body: String,
    pub attempts: Vec<DeliveryAttempt>,
}

impl DeliveryReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Backoff before the 2nd, 3rd, ... attempt: 1s, 2s, 4s, ...
fn backoff_schedule() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2).factor(500)
}

/// Delivers payloads to subscribers.
///
/// Each delivery signs the serialized body with the subscriber's secret and
/// makes up to [`MAX_ATTEMPTS`] POSTs. 2xx stops with success, 4xx stops with
/// a terminal rejection, anything else is retried after an exponential backoff.
pub struct WebhookDispatcher {
    transport: Arc<dyn WebhookTransport>,
}

impl WebhookDispatcher {
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self { transport }
    }

    /// Delivers without a cancellation signal.
    pub async fn deliver(
        &self,
        webhook: &Webhook,
        payload: &WebhookPayload,
    ) -> Result<DeliveryReport, DeliveryError> {
        self.deliver_until(webhook, payload, std::future::pending())
            .await
    }

    /// Delivers until done or until `cancelled` resolves.
    ///
    /// Cancellation is observed while waiting between attempts and yields
    /// [`DeliveryError::Cancelled`] carrying the report so far.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Serialize`] if the payload cannot be encoded.
    /// Rejections and exhausted retries are reported through
    /// [`DeliveryReport::outcome`], not as errors.
    pub async fn deliver_until<F>(
        &self,
        webhook: &Webhook,
        payload: &WebhookPayload,
        cancelled: F,
    ) -> Result<DeliveryReport, DeliveryError>
    where
        F: Future<Output = ()>,
    {
        let body = serde_json::to_vec(payload)?;
        let signature = signature::sign(&body, &webhook.secret);
        let event = payload.event.as_str();

        tokio::pin!(cancelled);
        let mut delays = backoff_schedule();
        let mut report = DeliveryReport {
            outcome: DeliveryOutcome::Exhausted,
            status: None,
            response_body: String::new(),
            attempts: Vec::with_capacity(MAX_ATTEMPTS as usize),
        };

        for number in 1..=MAX_ATTEMPTS {
            let mut attempt = DeliveryAttempt {
                number,
                status: None,
                error: None,
                backoff: None,
            };

            match self
                .transport
                .post(&webhook.url, body.clone(), signature.clone())
                .await
            {
                Ok(response) => {
                    let status = response.status;
                    attempt.status = Some(status);
                    report.status = Some(status);
                    report.response_body = response.body;

                    if (200..300).contains(&status) {
                        report.attempts.push(attempt);
                        return Ok(finish(report, DeliveryOutcome::Delivered, event, webhook));
                    }
                    if (400..500).contains(&status) {
                        report.attempts.push(attempt);
                        return Ok(finish(report, DeliveryOutcome::Rejected, event, webhook));
                    }
                    attempt.error = Some(format!("unexpected status {status}"));
                }
                Err(e) => attempt.error = Some(e.to_string()),
            }

            record_attempt(event, "retryable");
            warn!(
                webhook_id = %webhook.id,
                event,
                attempt = number,
                error = attempt.error.as_deref().unwrap_or_default(),
                "Webhook attempt failed"
            );

            if number == MAX_ATTEMPTS {
                report.attempts.push(attempt);
                break;
            }

            let delay = delays.next().unwrap_or(Duration::from_secs(1));
            attempt.backoff = Some(delay);
            report.attempts.push(attempt);
            debug!(webhook_id = %webhook.id, ?delay, "Retrying webhook");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut cancelled => {
                    report.outcome = DeliveryOutcome::Cancelled;
                    return Err(DeliveryError::Cancelled { report });
                }
            }
        }

        Ok(finish(report, DeliveryOutcome::Exhausted, event, webhook))
    }
}

fn finish(
    mut report: DeliveryReport,
    outcome: DeliveryOutcome,
    event: &'static str,
    webhook: &Webhook,
) -> DeliveryReport {
    report.outcome = outcome;
    if outcome != DeliveryOutcome::Exhausted {
        record_attempt(event, outcome.as_str());
    }
    debug!(
        webhook_id = %webhook.id,
        event,
        outcome = outcome.as_str(),
        attempts = report.attempts.len(),
        "Webhook delivery finished"
    );
    report
}

fn record_attempt(event: &'static str, outcome: &'static str) {
    metrics::counter!(
        "clickgate_webhook_attempts_total",
        "event" => event,
        "outcome" => outcome
    )
    .increment(1);
}
