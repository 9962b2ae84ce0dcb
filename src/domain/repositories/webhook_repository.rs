//! Repository trait for webhook subscribers.

use crate::domain::entities::Webhook;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// Lists active subscribers registered for `event`.
    async fn list_active_for_event(&self, event: &str) -> Result<Vec<Webhook>, AppError>;
}
