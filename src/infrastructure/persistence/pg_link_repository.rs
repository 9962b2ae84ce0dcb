//! PostgreSQL implementation of the link and variant registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkVariant};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for links and their A/B variants.
///
/// Variant counters are bumped with single `UPDATE ... SET n = n + 1`
/// statements, so concurrent clicks never lose increments.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: String,
    alias: String,
    target_url: String,
    domain: Option<String>,
    group_id: Option<String>,
    allowed_os: Vec<String>,
    allowed_devices: Vec<String>,
    allowed_browsers: Vec<String>,
    allowed_countries: Vec<String>,
    block_bots: bool,
    fallback_url: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    max_clicks: Option<i64>,
    active_from: Option<DateTime<Utc>>,
    active_until: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            alias: row.alias,
            target_url: row.target_url,
            domain: row.domain,
            group_id: row.group_id,
            allowed_os: row.allowed_os,
            allowed_devices: row.allowed_devices,
            allowed_browsers: row.allowed_browsers,
            allowed_countries: row.allowed_countries,
            block_bots: row.block_bots,
            fallback_url: row.fallback_url,
            expires_at: row.expires_at,
            max_clicks: row.max_clicks,
            active_from: row.active_from,
            active_until: row.active_until,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: String,
    link_alias: String,
    label: String,
    target_url: String,
    weight: i32,
    clicks: i64,
    conversions: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VariantRow> for LinkVariant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: row.id,
            link_alias: row.link_alias,
            label: row.label,
            target_url: row.target_url,
            weight: row.weight,
            clicks: row.clicks,
            conversions: row.conversions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VARIANT_COLUMNS: &str =
    "id, link_alias, label, target_url, weight, clicks, conversions, created_at, updated_at";

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, alias, target_url, domain, group_id,
                   allowed_os, allowed_devices, allowed_browsers, allowed_countries,
                   block_bots, fallback_url, expires_at, max_clicks,
                   active_from, active_until, is_active, created_at, updated_at
            FROM links
            WHERE alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_variants(&self, alias: &str) -> Result<Vec<LinkVariant>, AppError> {
        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM link_variants WHERE link_alias = $1 ORDER BY created_at, id"
        ))
        .bind(alias)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(LinkVariant::from).collect())
    }

    async fn find_variant(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<Option<LinkVariant>, AppError> {
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM link_variants WHERE link_alias = $1 AND id = $2"
        ))
        .bind(alias)
        .bind(variant_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(LinkVariant::from))
    }

    async fn increment_variant_clicks(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE link_variants
            SET clicks = clicks + 1, updated_at = NOW()
            WHERE link_alias = $1 AND id = $2
            "#,
        )
        .bind(alias)
        .bind(variant_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn increment_variant_conversions(
        &self,
        alias: &str,
        variant_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE link_variants
            SET conversions = conversions + 1, updated_at = NOW()
            WHERE link_alias = $1 AND id = $2
            "#,
        )
        .bind(alias)
        .bind(variant_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
