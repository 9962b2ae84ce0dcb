//! A/B conversion tracking.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Records conversions against the variant a visitor was sent to.
pub struct VariantService {
    links: Arc<dyn LinkRepository>,
}

impl VariantService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Adds one conversion to `variant_id` of `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank variant id,
    /// [`AppError::NotFound`] if the variant does not belong to the alias and
    /// [`AppError::Internal`] on database errors.
    pub async fn record_conversion(&self, alias: &str, variant_id: &str) -> Result<(), AppError> {
        let variant_id = variant_id.trim();
        if variant_id.is_empty() {
            return Err(AppError::bad_request(
                "variantId is required",
                json!({ "field": "variantId" }),
            ));
        }

        if !self
            .links
            .increment_variant_conversions(alias, variant_id)
            .await?
        {
            return Err(AppError::not_found(
                "Variant not found",
                json!({ "alias": alias, "variant_id": variant_id }),
            ));
        }

        info!(alias, variant_id, "Conversion recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    #[tokio::test]
    async fn test_record_conversion() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_variant_conversions()
            .withf(|alias, id| alias == "promo" && id == "v-a")
            .times(1)
            .returning(|_, _| Ok(true));

        let service = VariantService::new(Arc::new(repo));
        service.record_conversion("promo", " v-a ").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_variant_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_variant_conversions()
            .returning(|_, _| Ok(false));

        let service = VariantService::new(Arc::new(repo));
        let err = service.record_conversion("promo", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blank_variant_is_rejected() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_variant_conversions().never();

        let service = VariantService::new(Arc::new(repo));
        let err = service.record_conversion("promo", "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
