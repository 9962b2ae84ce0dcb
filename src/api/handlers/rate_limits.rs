//! Handlers for rate-limit administration.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use tracing::info;

use crate::api::dto::rate_limits::{RateLimitListResponse, ResetRateLimitRequest};
use crate::error::AppError;
use crate::infrastructure::rate_limit::RateLimitError;
use crate::state::AppState;

fn store_error(e: RateLimitError) -> AppError {
    tracing::error!(error = %e, "Rate limit store error");
    AppError::internal("Rate limit store unavailable", json!({}))
}

/// Lists every tracked rate-limit key.
///
/// # Endpoint
///
/// `GET /admin/rate-limits`
///
/// # Response
///
/// ```json
/// {
///   "total": 1,
///   "items": [
///     { "key": "ip:203.0.113.7", "count": 12, "expiresAt": "2025-01-01T00:01:00Z" }
///   ]
/// }
/// ```
pub async fn rate_limit_list_handler(
    State(state): State<AppState>,
) -> Result<Json<RateLimitListResponse>, AppError> {
    let items = state.rate_limiter.list().await.map_err(store_error)?;

    Ok(Json(RateLimitListResponse {
        total: items.len(),
        items,
    }))
}

/// Clears the window of one key.
///
/// # Endpoint
///
/// `DELETE /admin/rate-limits` with body `{"key": "ip:203.0.113.7"}`
///
/// # Errors
///
/// Returns 400 Bad Request if the key is blank.
pub async fn reset_rate_limit_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetRateLimitRequest>,
) -> Result<StatusCode, AppError> {
    let key = payload.key.trim();
    if key.is_empty() {
        return Err(AppError::bad_request(
            "Key is required",
            json!({ "field": "key" }),
        ));
    }

    state.rate_limiter.reset(key).await.map_err(store_error)?;
    info!(key, "Rate limit reset");

    Ok(StatusCode::NO_CONTENT)
}
