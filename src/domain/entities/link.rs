//! Link entity representing a redirect rule.

use chrono::{DateTime, Utc};

/// A short link with its admission rules.
///
/// Empty allow-lists mean "unrestricted". When both schedule bounds are set,
/// `active_from` must not be after `active_until`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: String,
    pub alias: String,
    pub target_url: String,
    pub domain: Option<String>,
    pub group_id: Option<String>,
    pub allowed_os: Vec<String>,
    pub allowed_devices: Vec<String>,
    pub allowed_browsers: Vec<String>,
    pub allowed_countries: Vec<String>,
    pub block_bots: bool,
    pub fallback_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub active_from: Option<DateTime<Utc>>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates an unrestricted link.
    pub fn new(id: impl Into<String>, alias: impl Into<String>, target_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            alias: alias.into(),
            target_url: target_url.into(),
            domain: None,
            group_id: None,
            allowed_os: Vec::new(),
            allowed_devices: Vec::new(),
            allowed_browsers: Vec::new(),
            allowed_countries: Vec::new(),
            block_bots: false,
            fallback_url: None,
            expires_at: None,
            max_clicks: None,
            active_from: None,
            active_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the fallback target if one is configured and not blank.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Returns true if the link restricts the request domain and `request_domain`
    /// is a different one.
    ///
    /// The restriction only applies when both sides are known.
    pub fn rejects_domain(&self, request_domain: Option<&str>) -> bool {
        match (self.domain.as_deref(), request_domain) {
            (Some(own), Some(requested)) if !own.is_empty() && !requested.is_empty() => {
                !own.eq_ignore_ascii_case(requested)
            }
            _ => false,
        }
    }

    pub fn is_not_yet_active(&self, now: DateTime<Utc>) -> bool {
        self.active_from.is_some_and(|from| now < from)
    }

    pub fn has_schedule_ended(&self, now: DateTime<Utc>) -> bool {
        self.active_until.is_some_and(|until| now > until)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }

    /// Returns true if the schedule bounds are consistent.
    pub fn has_valid_schedule(&self) -> bool {
        match (self.active_from, self.active_until) {
            (Some(from), Some(until)) => from <= until,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_link_is_unrestricted() {
        let link = Link::new("l1", "promo", "https://example.com");
        assert!(link.is_active);
        assert!(link.allowed_os.is_empty());
        assert!(link.fallback().is_none());
        assert!(!link.is_expired(Utc::now()));
        assert!(link.has_valid_schedule());
    }

    #[test]
    fn test_blank_fallback_is_ignored() {
        let mut link = Link::new("l1", "promo", "https://example.com");
        link.fallback_url = Some("   ".to_string());
        assert!(link.fallback().is_none());

        link.fallback_url = Some(" https://fallback.example.com ".to_string());
        assert_eq!(link.fallback(), Some("https://fallback.example.com"));
    }

    #[test]
    fn test_domain_restriction() {
        let mut link = Link::new("l1", "promo", "https://example.com");
        assert!(!link.rejects_domain(Some("go.example.com")));

        link.domain = Some("go.example.com".to_string());
        assert!(!link.rejects_domain(Some("GO.Example.com")));
        assert!(link.rejects_domain(Some("other.example.com")));
        assert!(!link.rejects_domain(None));
        assert!(!link.rejects_domain(Some("")));
    }

    #[test]
    fn test_schedule_checks() {
        let now = Utc::now();
        let mut link = Link::new("l1", "promo", "https://example.com");

        link.active_from = Some(now + Duration::hours(1));
        assert!(link.is_not_yet_active(now));
        assert!(!link.is_not_yet_active(now + Duration::hours(2)));

        link.active_until = Some(now - Duration::hours(1));
        assert!(link.has_schedule_ended(now));
        assert!(!link.has_valid_schedule());

        link.expires_at = Some(now - Duration::seconds(1));
        assert!(link.is_expired(now));
    }
}
