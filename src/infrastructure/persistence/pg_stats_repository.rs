//! PostgreSQL implementation of the per-node hit counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::LinkStat;
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

/// PostgreSQL repository for `(node, alias)` hit counters.
///
/// Rows are keyed by `nodeId#alias`. Increments are a single upsert.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StatRow {
    id: String,
    node_id: String,
    alias: String,
    hit_count: i64,
    last_hit_at: DateTime<Utc>,
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn get(&self, node_id: &str, alias: &str) -> Result<Option<LinkStat>, AppError> {
        let Some(key) = LinkStat::key(node_id, alias) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, StatRow>(
            "SELECT id, node_id, alias, hit_count, last_hit_at FROM link_stats WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| LinkStat {
            id: r.id,
            node_id: r.node_id,
            alias: r.alias,
            hit_count: r.hit_count,
            last_hit_at: r.last_hit_at,
        }))
    }

    async fn increment_hit(&self, node_id: &str, alias: &str) -> Result<(), AppError> {
        let Some(key) = LinkStat::key(node_id, alias) else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO link_stats (id, node_id, alias, hit_count, last_hit_at)
            VALUES ($1, $2, $3, 1, NOW())
            ON CONFLICT (id) DO UPDATE
            SET hit_count = link_stats.hit_count + 1,
                last_hit_at = EXCLUDED.last_hit_at
            "#,
        )
        .bind(key)
        .bind(node_id)
        .bind(alias)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
