//! Per-node hit counter.

use chrono::{DateTime, Utc};

/// Hit counter for one `(node, alias)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStat {
    pub id: String,
    pub node_id: String,
    pub alias: String,
    pub hit_count: i64,
    pub last_hit_at: DateTime<Utc>,
}

impl LinkStat {
    /// Builds the counter key `nodeId#alias`.
    ///
    /// Returns `None` when either part is empty: anonymous nodes are not counted.
    pub fn key(node_id: &str, alias: &str) -> Option<String> {
        if node_id.is_empty() || alias.is_empty() {
            return None;
        }
        Some(format!("{node_id}#{alias}"))
    }
}
