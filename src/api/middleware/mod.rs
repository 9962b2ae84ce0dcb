//! HTTP middleware for request processing and protection.
//!
//! Provides API key authentication, sliding-window rate limiting, and
//! observability middleware.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
