//! Handler for A/B conversion reports.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::convert::ConvertQuery;
use crate::error::AppError;
use crate::state::AppState;

/// Records a conversion for one variant of a link.
///
/// # Endpoint
///
/// `POST /links/{alias}/convert?variantId=<id>`
///
/// # Errors
///
/// Returns 400 Bad Request if `variantId` is missing or blank and
/// 404 Not Found if the variant does not belong to the alias.
pub async fn convert_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(query): Query<ConvertQuery>,
) -> Result<StatusCode, AppError> {
    query.validate()?;

    let variant_id = query.variant_id.unwrap_or_default();
    state
        .variant_service
        .record_conversion(&alias, &variant_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
