//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`                 - Health check: database, rate limit store (public)
//! - `GET  /links/resolve`          - Click resolution (API key, rate limited)
//! - `POST /links/{alias}/convert`  - Conversion report (API key)
//! - `/admin/rate-limits`           - Rate limit administration (API key)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - `X-Api-Key` shared secret
//! - **Rate limiting** - Per-IP and per-link sliding windows on resolution
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes::protected_routes(state.clone()))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
