//! API route configuration.
//!
//! All endpoints here require the `X-Api-Key` header, checked by
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    convert_handler, rate_limit_list_handler, reset_rate_limit_handler, resolve_handler,
};
use crate::api::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All API routes, protected by API key authentication.
///
/// # Endpoints
///
/// - `GET    /links/resolve`          - Resolve a click (sliding-window rate limited)
/// - `POST   /links/{alias}/convert`  - Record an A/B conversion
/// - `GET    /admin/rate-limits`      - List tracked rate-limit keys
/// - `DELETE /admin/rate-limits`      - Reset one rate-limit key
pub fn protected_routes(state: AppState) -> Router<AppState> {
    let resolve = Router::new()
        .route("/links/resolve", get(resolve_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    Router::new()
        .merge(resolve)
        .route("/links/{alias}/convert", post(convert_handler))
        .route(
            "/admin/rate-limits",
            get(rate_limit_list_handler).delete(reset_rate_limit_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
