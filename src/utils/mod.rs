//! Utility functions shared by the API layer and the admin CLI.
//!
//! - [`signature`] - HMAC-SHA256 webhook signing and verification
//! - [`visitor_headers`] - Visitor IP, user agent and referrer extraction

pub mod signature;
pub mod visitor_headers;
