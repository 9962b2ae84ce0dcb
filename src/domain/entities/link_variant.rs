//! A/B variant of a link.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One alternative destination of a link.
///
/// Weights are in `0..=100`. Keeping the per-link sum at or below 100 is the
/// job of whoever edits variants; selection accepts any non-negative weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkVariant {
    pub id: String,
    pub link_alias: String,
    pub label: String,
    pub target_url: String,
    pub weight: i32,
    pub clicks: i64,
    pub conversions: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkVariant {
    pub fn new(
        id: impl Into<String>,
        link_alias: impl Into<String>,
        target_url: impl Into<String>,
        weight: i32,
    ) -> Self {
        let id = id.into();
        let now = Utc::now();
        Self {
            label: id.clone(),
            id,
            link_alias: link_alias.into(),
            target_url: target_url.into(),
            weight,
            clicks: 0,
            conversions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Conversion rate in percent; zero until the variant has been clicked.
    pub fn conversion_rate(&self) -> f64 {
        if self.clicks <= 0 {
            return 0.0;
        }
        self.conversions as f64 / self.clicks as f64 * 100.0
    }
}
