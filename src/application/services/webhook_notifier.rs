//! Fire-and-forget fan-out of events to webhook subscribers.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::services::webhook_dispatcher::{DeliveryError, WebhookDispatcher};
use crate::domain::clock::Clock;
use crate::domain::entities::{WebhookEvent, WebhookPayload};
use crate::domain::repositories::WebhookRepository;

/// Emits domain events without blocking the caller.
#[cfg_attr(test, mockall::automock)]
pub trait EventNotifier: Send + Sync {
    /// Schedules delivery of `event` to every interested subscriber.
    ///
    /// Must return immediately; failures are logged by the implementation.
    fn notify(&self, event: WebhookEvent, data: Map<String, Value>);
}

/// [`EventNotifier`] that looks up subscribers and delivers to each one in
/// its own background task.
///
/// Flipping the shutdown channel to `true` aborts pending retry waits.
pub struct WebhookNotifier {
    subscribers: Arc<dyn WebhookRepository>,
    dispatcher: Arc<WebhookDispatcher>,
    clock: Arc<dyn Clock>,
    shutdown: watch::Receiver<bool>,
}

impl WebhookNotifier {
    pub fn new(
        subscribers: Arc<dyn WebhookRepository>,
        dispatcher: Arc<WebhookDispatcher>,
        clock: Arc<dyn Clock>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            subscribers,
            dispatcher,
            clock,
            shutdown,
        }
    }
}

impl EventNotifier for WebhookNotifier {
    fn notify(&self, event: WebhookEvent, data: Map<String, Value>) {
        let subscribers = self.subscribers.clone();
        let dispatcher = self.dispatcher.clone();
        let shutdown = self.shutdown.clone();
        let payload = Arc::new(WebhookPayload::new(event, self.clock.now(), data));

        tokio::spawn(async move {
            let hooks = match subscribers.list_active_for_event(event.as_str()).await {
                Ok(hooks) => hooks,
                Err(e) => {
                    warn!(%event, "Failed to load webhook subscribers: {}", e);
                    return;
                }
            };

            if hooks.is_empty() {
                debug!(%event, "No webhook subscribers");
                return;
            }

            for hook in hooks {
                let dispatcher = dispatcher.clone();
                let payload = payload.clone();
                let mut shutdown = shutdown.clone();

                tokio::spawn(async move {
                    let cancelled = async move {
                        // A dropped sender means nobody will ever cancel.
                        if shutdown.wait_for(|stop| *stop).await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    };

                    match dispatcher.deliver_until(&hook, &payload, cancelled).await {
                        Ok(report) if report.succeeded() => {
                            info!(
                                webhook_id = %hook.id,
                                %event,
                                attempts = report.attempts.len(),
                                "Webhook delivered"
                            );
                        }
                        Ok(report) => {
                            warn!(
                                webhook_id = %hook.id,
                                %event,
                                outcome = ?report.outcome,
                                status = ?report.status,
                                attempts = report.attempts.len(),
                                "Webhook delivery failed"
                            );
                        }
                        Err(DeliveryError::Cancelled { report }) => {
                            warn!(
                                webhook_id = %hook.id,
                                %event,
                                attempts = report.attempts.len(),
                                "Webhook delivery cancelled"
                            );
                        }
                        Err(e) => {
                            warn!(webhook_id = %hook.id, %event, "Webhook delivery error: {}", e);
                        }
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::webhook_dispatcher::{
        MockWebhookTransport, TransportResponse,
    };
    use crate::domain::clock::ManualClock;
    use crate::domain::entities::Webhook;
    use crate::domain::repositories::MockWebhookRepository;
    use crate::error::AppError;
    use crate::utils::signature;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_delivers_signed_payload_to_each_subscriber() {
        let mut repo = MockWebhookRepository::new();
        repo.expect_list_active_for_event()
            .withf(|event| event == "link.expired")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Webhook::new("w1", "https://a.example.com/hook", "secret-a"),
                    Webhook::new("w2", "https://b.example.com/hook", "secret-b"),
                ])
            });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = MockWebhookTransport::new();
        transport.expect_post().times(2).returning(move |url, body, sig| {
            let _ = tx.send((url.to_string(), body, sig));
            Ok(TransportResponse {
                status: 200,
                body: String::new(),
            })
        });

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier = WebhookNotifier::new(
            Arc::new(repo),
            Arc::new(WebhookDispatcher::new(Arc::new(transport))),
            clock(),
            shutdown_rx,
        );

        let mut data = Map::new();
        data.insert("alias".to_string(), json!("promo"));
        notifier.notify(WebhookEvent::LinkExpired, data);

        let mut seen = Vec::new();
        for _ in 0..2 {
            let delivery = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            seen.push(delivery);
        }
        seen.sort_by(|a, b| a.0.cmp(&b.0));

        let (url, body, sig) = &seen[0];
        assert_eq!(url, "https://a.example.com/hook");
        assert!(signature::verify(body, sig, "secret-a"));
        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["event"], "link.expired");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(value["data"]["alias"], "promo");

        let (url, body, sig) = &seen[1];
        assert_eq!(url, "https://b.example.com/hook");
        assert!(signature::verify(body, sig, "secret-b"));
    }

    #[tokio::test]
    async fn test_subscriber_lookup_failure_is_swallowed() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut repo = MockWebhookRepository::new();
        repo.expect_list_active_for_event().returning(move |_| {
            let _ = tx.send(());
            Err(AppError::internal("Database error", json!({})))
        });

        let mut transport = MockWebhookTransport::new();
        transport.expect_post().never();

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier = WebhookNotifier::new(
            Arc::new(repo),
            Arc::new(WebhookDispatcher::new(Arc::new(transport))),
            clock(),
            shutdown_rx,
        );

        notifier.notify(WebhookEvent::ClickCreated, Map::new());
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
    }
}
