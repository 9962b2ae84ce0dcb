//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod convert;
pub mod health;
pub mod rate_limits;
pub mod resolve;

pub use convert::convert_handler;
pub use health::health_handler;
pub use rate_limits::{rate_limit_list_handler, reset_rate_limit_handler};
pub use resolve::resolve_handler;
