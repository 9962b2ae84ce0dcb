//! Repository trait for per-node hit counters.

use crate::domain::entities::LinkStat;
use crate::error::AppError;
use async_trait::async_trait;

/// Hit counters keyed by `nodeId#alias` (see [`LinkStat::key`]).
///
/// Both operations are no-ops for an empty node id: `get` yields `None` and
/// `increment_hit` succeeds without writing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Reads the current counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get(&self, node_id: &str, alias: &str) -> Result<Option<LinkStat>, AppError>;

    /// Adds one to the counter in a single atomic statement, creating it if needed.
    async fn increment_hit(&self, node_id: &str, alias: &str) -> Result<(), AppError>;
}
