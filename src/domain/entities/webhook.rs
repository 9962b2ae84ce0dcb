//! Webhook subscriber and event payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Event names a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WebhookEvent {
    #[serde(rename = "click.created")]
    ClickCreated,
    #[serde(rename = "link.created")]
    LinkCreated,
    #[serde(rename = "link.updated")]
    LinkUpdated,
    #[serde(rename = "link.deleted")]
    LinkDeleted,
    #[serde(rename = "link.expired")]
    LinkExpired,
    #[serde(rename = "link.maxclicks")]
    LinkMaxClicks,
    #[serde(rename = "node.offline")]
    NodeOffline,
    #[serde(rename = "traffic.blocked")]
    TrafficBlocked,
}

impl WebhookEvent {
    pub const ALL: [WebhookEvent; 8] = [
        WebhookEvent::ClickCreated,
        WebhookEvent::LinkCreated,
        WebhookEvent::LinkUpdated,
        WebhookEvent::LinkDeleted,
        WebhookEvent::LinkExpired,
        WebhookEvent::LinkMaxClicks,
        WebhookEvent::NodeOffline,
        WebhookEvent::TrafficBlocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::ClickCreated => "click.created",
            WebhookEvent::LinkCreated => "link.created",
            WebhookEvent::LinkUpdated => "link.updated",
            WebhookEvent::LinkDeleted => "link.deleted",
            WebhookEvent::LinkExpired => "link.expired",
            WebhookEvent::LinkMaxClicks => "link.maxclicks",
            WebhookEvent::NodeOffline => "node.offline",
            WebhookEvent::TrafficBlocked => "traffic.blocked",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered subscriber endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Webhook {
    pub id: String,
    pub url: String,
    pub events: Vec<String>,
    pub secret: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Webhook {
    pub fn new(id: impl Into<String>, url: impl Into<String>, secret: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            url: url.into(),
            events: WebhookEvent::ALL.iter().map(|e| e.as_str().to_string()).collect(),
            secret: secret.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn subscribes_to(&self, event: WebhookEvent) -> bool {
        self.is_active && self.events.iter().any(|e| e == event.as_str())
    }
}

/// Body POSTed to subscribers. Timestamps serialize as RFC 3339.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub event: WebhookEvent,
    pub timestamp: DateTime<Utc>,
    pub data: Map<String, Value>,
}

impl WebhookPayload {
    pub fn new(event: WebhookEvent, timestamp: DateTime<Utc>, data: Map<String, Value>) -> Self {
        Self {
            event,
            timestamp,
            data,
        }
    }
}
