//! Click audit record.

use chrono::{DateTime, Utc};

/// One click attempt that reached the logging stage of the pipeline.
///
/// Blocked attempts are logged too, so the record carries every derived
/// classification attribute alongside the raw visitor headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickEvent {
    pub alias: String,
    pub node_id: String,
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub os: String,
    pub device: String,
    pub browser: String,
    pub is_bot: bool,
    pub bot_type: String,
    pub is_vpn: bool,
    pub is_tor: bool,
    pub is_proxy: bool,
    pub fraud_score: i32,
    pub risk_score: i32,
    pub ip_check_provider: String,
    pub user_agent: String,
    pub referer: String,
    pub created_at: DateTime<Utc>,
}
