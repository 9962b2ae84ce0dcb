//! Visitor attributes forwarded by the edge agent.

use axum::http::{HeaderMap, header};
use std::net::SocketAddr;

use crate::domain::entities::VisitorContext;

pub const REAL_IP: &str = "x-real-ip";
pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const VISITOR_USER_AGENT: &str = "x-visitor-user-agent";
pub const VISITOR_REFERER: &str = "x-visitor-referer";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Resolves the visitor IP.
///
/// Priority:
/// 1. `X-Real-IP`
/// 2. First entry of `X-Forwarded-For`
/// 3. Peer socket address
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(ip) = header_str(headers, REAL_IP) {
        return ip.to_string();
    }

    if let Some(first) = header_str(headers, FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    peer.ip().to_string()
}

/// Collects IP, user agent and referrer.
///
/// The `X-Visitor-*` headers take precedence over the agent's own
/// `User-Agent` and `Referer`.
pub fn visitor_context(headers: &HeaderMap, peer: SocketAddr) -> VisitorContext {
    let user_agent = header_str(headers, VISITOR_USER_AGENT)
        .or_else(|| header_str(headers, header::USER_AGENT.as_str()))
        .unwrap_or_default()
        .to_string();

    let referer = header_str(headers, VISITOR_REFERER)
        .or_else(|| header_str(headers, header::REFERER.as_str()))
        .unwrap_or_default()
        .to_string();

    VisitorContext {
        ip: client_ip(headers, peer),
        user_agent,
        referer,
    }
}
