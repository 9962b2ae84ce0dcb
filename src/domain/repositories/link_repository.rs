//! Repository trait for the link and variant registry.

use crate::domain::entities::{Link, LinkVariant};
use crate::error::AppError;
use async_trait::async_trait;

/// Read access to links and their A/B variants, plus the variant counters.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError>;

    /// Lists the variants of a link in their stored order.
    ///
    /// Returns an empty list for links without A/B testing.
    async fn list_variants(&self, alias: &str) -> Result<Vec<LinkVariant>, AppError>;

    /// Finds a single variant of a link.
    async fn find_variant(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<Option<LinkVariant>, AppError>;

    /// Atomically adds one to the variant's click counter.
    async fn increment_variant_clicks(&self, alias: &str, variant_id: &str)
    -> Result<(), AppError>;

    /// Atomically adds one to the variant's conversion counter.
    ///
    /// Returns `Ok(false)` if the variant does not exist.
    async fn increment_variant_conversions(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<bool, AppError>;
}
