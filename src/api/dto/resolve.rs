//! DTOs for the click resolution endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters of `GET /links/resolve`.
///
/// `alias` is optional at the parsing level so that a missing alias yields a
/// structured 400 instead of axum's plain-text rejection.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    #[validate(length(max = 255))]
    pub alias: Option<String>,

    /// Identifier of the edge node that received the click.
    #[validate(length(max = 128))]
    pub node_id: Option<String>,

    /// Host the visitor requested, checked against the link's bound domain.
    #[validate(length(max = 253))]
    pub domain: Option<String>,
}

/// Successful resolution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub target_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

/// Denied resolution answered with the link's fallback URL.
#[derive(Debug, Serialize)]
pub struct FallbackResponse {
    pub target: String,
    pub reason: String,
}
