//! Outbound webhook transport.

mod http_transport;

pub use http_transport::{HttpTransport, SIGNATURE_HEADER, USER_AGENT};
