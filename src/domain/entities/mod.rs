//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A redirect rule with its admission constraints
//! - [`LinkVariant`] - An A/B alternative of a link
//! - [`LinkStat`] - Per-node hit counter
//! - [`ClickEvent`] - Audit record of one click attempt
//! - [`Webhook`], [`WebhookEvent`], [`WebhookPayload`] - Subscriber notifications
//! - [`Settings`] - Global admission policy
//! - [`ResolveRequest`], [`VisitorContext`] - Inputs of one resolution

pub mod click_event;
pub mod link;
pub mod link_stat;
pub mod link_variant;
pub mod settings;
pub mod visitor;
pub mod webhook;

pub use click_event::ClickEvent;
pub use link::Link;
pub use link_stat::LinkStat;
pub use link_variant::LinkVariant;
pub use settings::Settings;
pub use visitor::{ResolveRequest, VisitorContext};
pub use webhook::{Webhook, WebhookEvent, WebhookPayload};
