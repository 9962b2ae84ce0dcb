//! Repository trait for the click audit log.

use crate::domain::entities::ClickEvent;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event.
    async fn log_click(&self, event: ClickEvent) -> Result<(), AppError>;
}
