//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`classifiers`] - User-agent, IP reputation and geolocation classifiers
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`rate_limit`] - Sliding-window stores (Redis and in-process)
//! - [`webhook`] - HTTP transport for webhook deliveries

pub mod classifiers;
pub mod persistence;
pub mod rate_limit;
pub mod webhook;
