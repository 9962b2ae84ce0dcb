//! The click resolution pipeline.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::application::services::reputation_chain::ReputationChain;
use crate::application::services::settings_service::SettingsService;
use crate::application::services::webhook_notifier::EventNotifier;
use crate::domain::access_rules::{DenyReason, os_allowed, value_allowed};
use crate::domain::classifiers::{GeoLocator, Reputation, UserAgentClassifier};
use crate::domain::clock::Clock;
use crate::domain::entities::{ClickEvent, Link, ResolveRequest, Settings, WebhookEvent};
use crate::domain::repositories::{ClickRepository, LinkRepository, StatsRepository};
use crate::domain::variant_selector::select_variant;
use crate::error::AppError;

/// Final outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Admitted. `variant_id` is set when an A/B variant was chosen.
    Redirect {
        target_url: String,
        variant_id: Option<String>,
    },
    /// Rejected by a policy. A configured fallback turns the denial into a
    /// redirect-equivalent answer.
    Denied {
        reason: DenyReason,
        fallback_url: Option<String>,
    },
    NotFound,
}

impl Resolution {
    fn metric_label(&self) -> &'static str {
        match self {
            Resolution::Redirect { .. } => "redirect",
            Resolution::Denied { reason, .. } => reason.code(),
            Resolution::NotFound => "not_found",
        }
    }
}

/// Visitor classifiers used by the pipeline.
///
/// Reputation and geolocation are optional; an empty chain or a missing
/// locator leaves the corresponding click attributes blank.
#[derive(Clone)]
pub struct Classifiers {
    pub user_agent: Arc<dyn UserAgentClassifier>,
    pub reputation: ReputationChain,
    pub geo: Option<Arc<dyn GeoLocator>>,
}

/// Decides the fate of each click.
///
/// Policies run in a fixed order and the first failing one wins:
///
/// 1. lookup, domain restriction, schedule, expiry, click quota
/// 2. hit-count increment (always, even if a later policy denies)
/// 3. visitor classification
/// 4. link bot block, global reputation blocks
/// 5. OS, device, browser and country allow-lists
/// 6. admission with optional variant selection
///
/// Denials before classification are not written to the click log; later
/// ones are.
pub struct ResolverService {
    links: Arc<dyn LinkRepository>,
    stats: Arc<dyn StatsRepository>,
    clicks: Arc<dyn ClickRepository>,
    settings: Arc<SettingsService>,
    notifier: Arc<dyn EventNotifier>,
    classifiers: Classifiers,
    clock: Arc<dyn Clock>,
}

impl ResolverService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        stats: Arc<dyn StatsRepository>,
        clicks: Arc<dyn ClickRepository>,
        settings: Arc<SettingsService>,
        notifier: Arc<dyn EventNotifier>,
        classifiers: Classifiers,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            links,
            stats,
            clicks,
            settings,
            notifier,
            classifiers,
            clock,
        }
    }

    /// Resolves one click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the link registry or the hit
    /// counter fails. Classifier failures are swallowed.
    #[instrument(skip(self, request), fields(alias = %request.alias, node_id = %request.node_id))]
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, AppError> {
        let result = self.run_pipeline(request).await;

        let outcome = match &result {
            Ok(resolution) => resolution.metric_label(),
            Err(_) => "error",
        };
        metrics::counter!("clickgate_resolutions_total", "outcome" => outcome).increment(1);

        result
    }

    async fn run_pipeline(&self, request: &ResolveRequest) -> Result<Resolution, AppError> {
        let Some(link) = self.links.find_by_alias(&request.alias).await? else {
            debug!("Alias not found");
            return Ok(Resolution::NotFound);
        };
        let now = self.clock.now();

        if link.rejects_domain(request.domain.as_deref()) {
            return Ok(deny(&link, DenyReason::DomainNotAllowed));
        }
        if link.is_not_yet_active(now) {
            return Ok(deny(&link, DenyReason::NotYetActive));
        }
        if link.has_schedule_ended(now) {
            return Ok(deny(&link, DenyReason::ScheduleEnded));
        }
        if link.is_expired(now) {
            self.notifier
                .notify(WebhookEvent::LinkExpired, expired_data(&link, now));
            return Ok(deny(&link, DenyReason::Expired));
        }

        if let Some(max_clicks) = link.max_clicks {
            let hits = self
                .stats
                .get(&request.node_id, &request.alias)
                .await?
                .map(|stat| stat.hit_count);

            if let Some(hits) = hits
                && hits >= max_clicks
            {
                self.notifier.notify(
                    WebhookEvent::LinkMaxClicks,
                    max_clicks_data(&link, max_clicks, hits, now),
                );
                return Ok(deny(&link, DenyReason::MaxClicksReached));
            }
        }

        // Counted before the remaining policies run, so denied attempts
        // still consume the quota.
        self.stats
            .increment_hit(&request.node_id, &request.alias)
            .await?;

        let settings = self.settings.current().await;
        let (click, reputation) = self.classify(request, &settings, now).await;

        if link.block_bots && click.is_bot {
            return Ok(self.deny_logged(&link, click, DenyReason::BotBlocked).await);
        }
        if let Some(reason) = reputation.as_ref().and_then(|r| reputation_block(&settings, r)) {
            return Ok(self.deny_logged(&link, click, reason).await);
        }

        if !os_allowed(&link.allowed_os, &click.os) {
            return Ok(self.deny_logged(&link, click, DenyReason::OsNotAllowed).await);
        }
        if !value_allowed(&link.allowed_devices, &click.device) {
            return Ok(self.deny_logged(&link, click, DenyReason::DeviceNotAllowed).await);
        }
        if !value_allowed(&link.allowed_browsers, &click.browser) {
            return Ok(self.deny_logged(&link, click, DenyReason::BrowserNotAllowed).await);
        }
        if !value_allowed(&link.allowed_countries, &click.country) {
            return Ok(self.deny_logged(&link, click, DenyReason::CountryNotAllowed).await);
        }

        self.admit(&link, click, now).await
    }

    /// Builds the click record: user agent first, then the reputation
    /// chain, then geolocation when no provider supplied a country.
    async fn classify(
        &self,
        request: &ResolveRequest,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> (ClickEvent, Option<Reputation>) {
        let visitor = &request.visitor;
        let agent = self.classifiers.user_agent.classify(&visitor.user_agent);

        let mut click = ClickEvent {
            alias: request.alias.clone(),
            node_id: request.node_id.clone(),
            ip_address: visitor.ip.clone(),
            os: agent.os,
            device: agent.device,
            browser: agent.browser,
            is_bot: agent.is_bot,
            bot_type: agent.bot_type,
            user_agent: visitor.user_agent.clone(),
            referer: visitor.referer.clone(),
            created_at: now,
            ..ClickEvent::default()
        };

        let reputation = self
            .classifiers
            .reputation
            .evaluate(&visitor.ip, settings)
            .await;

        if let Some(rep) = &reputation {
            click.is_vpn = rep.is_vpn;
            click.is_tor = rep.is_tor;
            click.is_proxy = rep.is_proxy;
            click.fraud_score = rep.fraud_score;
            click.risk_score = rep.risk_score;
            click.country = rep.country_code.clone();
            click.ip_check_provider = rep.provider.clone();
        }

        if click.country.is_empty()
            && let Some(geo) = &self.classifiers.geo
            && let Some(location) = geo.locate(&visitor.ip)
        {
            debug!(
                ip = %visitor.ip,
                country = %location.country_code,
                city = %location.city,
                "GeoIP lookup"
            );
            click.country = location.country_code;
            click.city = location.city;
        }

        (click, reputation)
    }

    async fn deny_logged(&self, link: &Link, click: ClickEvent, reason: DenyReason) -> Resolution {
        warn!(
            ip = %click.ip_address,
            os = %click.os,
            device = %click.device,
            browser = %click.browser,
            country = %click.country,
            bot_type = %click.bot_type,
            "Visitor rejected"
        );
        self.record_click(click).await;
        deny(link, reason)
    }

    async fn admit(
        &self,
        link: &Link,
        click: ClickEvent,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AppError> {
        let data = click_data(link, &click, now);
        self.record_click(click).await;
        self.notifier.notify(WebhookEvent::ClickCreated, data);

        let variants = match self.links.list_variants(&link.alias).await {
            Ok(variants) => variants,
            Err(e) => {
                warn!("Failed to load variants, using link target: {}", e);
                Vec::new()
            }
        };

        let chosen = select_variant(&variants, &mut rand::rng()).cloned();

        let Some(variant) = chosen else {
            info!(target_url = %link.target_url, "Click admitted");
            return Ok(Resolution::Redirect {
                target_url: link.target_url.clone(),
                variant_id: None,
            });
        };

        info!(
            variant_id = %variant.id,
            label = %variant.label,
            weight = variant.weight,
            target_url = %variant.target_url,
            "Click admitted to variant"
        );

        let links = Arc::clone(&self.links);
        let alias = link.alias.clone();
        let variant_id = variant.id.clone();
        tokio::spawn(async move {
            if let Err(e) = links.increment_variant_clicks(&alias, &variant_id).await {
                warn!(%alias, %variant_id, "Failed to increment variant clicks: {}", e);
            }
        });

        Ok(Resolution::Redirect {
            target_url: variant.target_url,
            variant_id: Some(variant.id),
        })
    }

    async fn record_click(&self, click: ClickEvent) {
        if let Err(e) = self.clicks.log_click(click).await {
            warn!("Failed to log click: {}", e);
        }
    }
}

fn deny(link: &Link, reason: DenyReason) -> Resolution {
    let fallback_url = link.fallback().map(str::to_string);
    warn!(
        reason = reason.code(),
        fallback = fallback_url.is_some(),
        "Click denied"
    );
    Resolution::Denied {
        reason,
        fallback_url,
    }
}

/// Global VPN, Tor, proxy and bot blocks, checked in that order.
fn reputation_block(settings: &Settings, reputation: &Reputation) -> Option<DenyReason> {
    if settings.block_vpn && reputation.is_vpn {
        Some(DenyReason::VpnBlocked)
    } else if settings.block_tor && reputation.is_tor {
        Some(DenyReason::TorBlocked)
    } else if settings.block_proxies && reputation.is_proxy {
        Some(DenyReason::ProxyBlocked)
    } else if settings.block_bots && reputation.is_bot {
        Some(DenyReason::BotBlocked)
    } else {
        None
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn expired_data(link: &Link, now: DateTime<Utc>) -> Map<String, Value> {
    into_map(json!({
        "linkId": link.id,
        "alias": link.alias,
        "targetUrl": link.target_url,
        "expiresAt": link.expires_at.map(rfc3339),
        "timestamp": rfc3339(now),
    }))
}

fn max_clicks_data(link: &Link, max_clicks: i64, hits: i64, now: DateTime<Utc>) -> Map<String, Value> {
    into_map(json!({
        "linkId": link.id,
        "alias": link.alias,
        "targetUrl": link.target_url,
        "maxClicks": max_clicks,
        "totalClicks": hits,
        "timestamp": rfc3339(now),
    }))
}

fn click_data(link: &Link, click: &ClickEvent, now: DateTime<Utc>) -> Map<String, Value> {
    into_map(json!({
        "linkId": link.id,
        "alias": link.alias,
        "targetUrl": link.target_url,
        "nodeId": click.node_id,
        "ipAddress": click.ip_address,
        "userAgent": click.user_agent,
        "referer": click.referer,
        "country": click.country,
        "city": click.city,
        "deviceType": click.device,
        "osName": click.os,
        "browserName": click.browser,
        "isBot": click.is_bot,
        "timestamp": rfc3339(now),
    }))
}
