//! API key authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticates requests using the shared API key.
///
/// # Header Format
///
/// ```text
/// X-Api-Key: <key>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing or does not match
/// the configured key. The comparison runs in constant time.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/admin/rate-limits", get(rate_limit_list_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided.is_empty() || !constant_time_eq(provided.as_bytes(), st.api_key.as_bytes()) {
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "X-Api-Key header is missing or invalid"}),
        ));
    }

    Ok(next.run(req).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
