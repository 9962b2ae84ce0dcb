//! Denial reasons and allow-list matching rules.
//!
//! OS entries are matched as normalized substrings so that a detected
//! `"Windows 10"` satisfies an allowed `"Windows"`. Device, browser and
//! country entries require an exact case-insensitive match.

use serde::Serialize;
use std::fmt;

/// Why a click was refused by the admission pipeline.
///
/// The [`code`](DenyReason::code) is stable and is what agents and dashboards
/// branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    DomainNotAllowed,
    NotYetActive,
    ScheduleEnded,
    Expired,
    MaxClicksReached,
    BotBlocked,
    VpnBlocked,
    TorBlocked,
    ProxyBlocked,
    OsNotAllowed,
    DeviceNotAllowed,
    BrowserNotAllowed,
    CountryNotAllowed,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::DomainNotAllowed => "domain_not_allowed",
            DenyReason::NotYetActive => "not_yet_active",
            DenyReason::ScheduleEnded => "schedule_ended",
            DenyReason::Expired => "expired",
            DenyReason::MaxClicksReached => "max_clicks_reached",
            DenyReason::BotBlocked => "bot_blocked",
            DenyReason::VpnBlocked => "vpn_blocked",
            DenyReason::TorBlocked => "tor_blocked",
            DenyReason::ProxyBlocked => "proxy_blocked",
            DenyReason::OsNotAllowed => "os_not_allowed",
            DenyReason::DeviceNotAllowed => "device_not_allowed",
            DenyReason::BrowserNotAllowed => "browser_not_allowed",
            DenyReason::CountryNotAllowed => "country_not_allowed",
        }
    }

    /// Returns true when the link is permanently past its usable life
    /// (HTTP 410) rather than refused for this particular visitor (HTTP 403).
    pub fn is_gone(&self) -> bool {
        matches!(self, DenyReason::ScheduleEnded | DenyReason::Expired)
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Lowercases and strips spaces and underscores.
fn normalize_os(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Checks a detected OS against an allow-list.
///
/// An empty list allows everything. Blank entries never match.
pub fn os_allowed(allowed: &[String], detected: &str) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let detected = normalize_os(detected);
    allowed.iter().any(|entry| {
        let entry = normalize_os(entry);
        !entry.is_empty() && detected.contains(&entry)
    })
}

/// Checks a detected value against an allow-list by exact case-insensitive match.
///
/// An empty list allows everything.
pub fn value_allowed(allowed: &[String], detected: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|entry| entry.eq_ignore_ascii_case(detected))
}
