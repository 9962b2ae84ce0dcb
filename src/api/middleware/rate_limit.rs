//! Sliding-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, HeaderValue, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use tracing::warn;

use crate::application::services::RateLimitDecision;
use crate::domain::entities::WebhookEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::visitor_headers::client_ip;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

#[derive(Deserialize)]
struct AliasParam {
    alias: Option<String>,
}

fn alias_param(uri: &Uri) -> Option<String> {
    let Query(param) = Query::<AliasParam>::try_from_uri(uri).ok()?;
    param
        .alias
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

/// Applies the per-IP and per-link limits from the current settings.
///
/// # Keys
///
/// - `ip:<visitor ip>` limited to `rate_limit_per_ip`
/// - `link:<alias>` limited to `rate_limit_per_link`, only when the request
///   carries an `alias` query parameter
///
/// Every admitted response carries `X-RateLimit-Limit`,
/// `X-RateLimit-Remaining` and `X-RateLimit-Reset` (unix seconds) for the
/// per-IP window.
///
/// # Errors
///
/// Rejected requests receive `429 Too Many Requests` with a `Retry-After`
/// header, and a `traffic.blocked` event is emitted. Store failures admit the
/// request.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/links/resolve", get(resolve_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let settings = st.settings.current().await;
    let window = settings.rate_limit_window();
    let ip = client_ip(req.headers(), peer);
    let alias = alias_param(req.uri());

    let ip_key = format!("ip:{ip}");
    let decision = st
        .rate_limiter
        .allow(&ip_key, settings.rate_limit_per_ip, window)
        .await;
    if !decision.allowed {
        return reject(&st, &ip_key, &decision, &ip, alias.as_deref());
    }

    if let Some(alias) = alias.as_deref() {
        let link_key = format!("link:{alias}");
        let link_decision = st
            .rate_limiter
            .allow(&link_key, settings.rate_limit_per_link, window)
            .await;
        if !link_decision.allowed {
            return reject(&st, &link_key, &link_decision, &ip, Some(alias));
        }
    }

    let mut response = next.run(req).await;
    set_headers(response.headers_mut(), &decision);
    response
}

fn set_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    headers.insert(
        RESET_HEADER,
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}

fn reject(
    st: &AppState,
    key: &str,
    decision: &RateLimitDecision,
    ip: &str,
    alias: Option<&str>,
) -> Response {
    let now = st.clock.now();
    let retry_after = decision.retry_after_secs(now);

    warn!(key, limit = decision.limit, retry_after, "Rate limit exceeded");

    let mut data = Map::new();
    data.insert("key".to_string(), Value::from(key));
    data.insert("limit".to_string(), Value::from(decision.limit));
    data.insert("ip".to_string(), Value::from(ip));
    if let Some(alias) = alias {
        data.insert("alias".to_string(), Value::from(alias));
    }
    data.insert(
        "timestamp".to_string(),
        Value::from(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    st.notifier.notify(WebhookEvent::TrafficBlocked, data);

    let mut response = AppError::too_many_requests(
        "Rate limit exceeded",
        json!({ "key": key, "retry_after": retry_after }),
    )
    .into_response();
    set_headers(response.headers_mut(), decision);
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_param() {
        let uri: Uri = "/links/resolve?alias=promo&nodeId=n1".parse().unwrap();
        assert_eq!(alias_param(&uri).as_deref(), Some("promo"));

        let uri: Uri = "/links/resolve?alias=%20%20".parse().unwrap();
        assert_eq!(alias_param(&uri), None);

        let uri: Uri = "/links/resolve".parse().unwrap();
        assert_eq!(alias_param(&uri), None);
    }
}
