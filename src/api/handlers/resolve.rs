//! Handler for click resolution.

use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::resolve::{FallbackResponse, ResolveQuery, ResolveResponse};
use crate::application::services::Resolution;
use crate::domain::entities::ResolveRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::visitor_headers::visitor_context;

/// Decides where a click on a short link should go.
///
/// # Endpoint
///
/// `GET /links/resolve?alias=<alias>&nodeId=<node>&domain=<host>`
///
/// Visitor attributes come from `X-Real-IP` / `X-Forwarded-For`,
/// `X-Visitor-User-Agent` and `X-Visitor-Referer`, falling back to the
/// caller's own peer address and headers.
///
/// # Responses
///
/// - **200** `{"targetUrl": "...", "variantId": "..."}` - admitted
/// - **200** `{"target": "...", "reason": "..."}` - denied, fallback configured
/// - **403** / **410** with empty body - denied without fallback
/// - **404** with empty body - unknown alias
///
/// # Errors
///
/// Returns 400 Bad Request if the alias is missing or blank, and
/// 500 Internal Server Error if the registry is unavailable.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    query.validate()?;

    let alias = query.alias.as_deref().map(str::trim).unwrap_or_default();
    if alias.is_empty() {
        return Err(AppError::bad_request(
            "Alias is required",
            json!({ "field": "alias" }),
        ));
    }

    let mut request = ResolveRequest::new(alias).with_visitor(visitor_context(&headers, addr));
    if let Some(node_id) = query.node_id {
        request = request.with_node(node_id.trim());
    }
    if let Some(domain) = query.domain.as_deref().map(str::trim)
        && !domain.is_empty()
    {
        request = request.with_domain(domain);
    }

    let resolution = state.resolver.resolve(&request).await?;

    Ok(into_response(resolution))
}

fn into_response(resolution: Resolution) -> Response {
    match resolution {
        Resolution::Redirect {
            target_url,
            variant_id,
        } => Json(ResolveResponse {
            target_url,
            variant_id,
        })
        .into_response(),
        Resolution::Denied {
            reason,
            fallback_url: Some(target),
        } => Json(FallbackResponse {
            target,
            reason: reason.code().to_string(),
        })
        .into_response(),
        Resolution::Denied {
            reason,
            fallback_url: None,
        } => {
            if reason.is_gone() {
                StatusCode::GONE.into_response()
            } else {
                StatusCode::FORBIDDEN.into_response()
            }
        }
        Resolution::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}
