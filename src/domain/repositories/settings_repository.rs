//! Repository trait for the global settings record.

use crate::domain::entities::Settings;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the settings record, or `None` if it was never saved.
    async fn load(&self) -> Result<Option<Settings>, AppError>;
}
