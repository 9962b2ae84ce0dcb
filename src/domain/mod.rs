//! Domain layer containing business entities and logic.
//!
//! This module defines the data model of the resolution engine and the
//! contracts the application layer depends on. It has no knowledge of HTTP,
//! PostgreSQL or Redis.
//!
//! # Architecture
//!
//! - [`entities`] - Links, variants, counters, click events, webhooks and settings
//! - [`repositories`] - Data access trait definitions
//! - [`classifiers`] - Visitor classification contracts (user agent, reputation, geo)
//! - [`access_rules`] - Denial reasons and allow-list matching
//! - [`clock`] - Injectable time source
//! - [`variant_selector`] - Weighted choice between A/B variants
//!
//! # Design Principles
//!
//! - Repository and classifier traits are implemented in [`crate::infrastructure`]
//! - Every external call goes through a trait so tests can substitute fakes
//! - Business logic lives in services (see [`crate::application::services`])

pub mod access_rules;
pub mod classifiers;
pub mod clock;
pub mod entities;
pub mod repositories;
pub mod variant_selector;
