//! DTOs for rate-limit administration.

use serde::{Deserialize, Serialize};

use crate::application::services::RateLimitInfo;

/// Tracked rate-limit keys.
#[derive(Debug, Serialize)]
pub struct RateLimitListResponse {
    pub total: usize,
    pub items: Vec<RateLimitInfo>,
}

/// Body of `DELETE /admin/rate-limits`.
#[derive(Debug, Deserialize)]
pub struct ResetRateLimitRequest {
    #[serde(default)]
    pub key: String,
}
