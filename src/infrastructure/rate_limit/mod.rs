//! Counter stores for sliding-window rate limiting.
//!
//! Provides a [`WindowStore`] trait with two implementations:
//! - [`RedisWindowStore`] - Shared Redis sorted sets, used in production
//! - [`MemoryWindowStore`] - Process-local windows when Redis is not configured

mod memory_store;
mod redis_store;
mod store;

pub use memory_store::MemoryWindowStore;
pub use redis_store::RedisWindowStore;
pub use store::{RateLimitError, RateLimitResult, WindowSnapshot, WindowStore};
