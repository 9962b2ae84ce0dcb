//! PostgreSQL implementation of the click audit log.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Append-only store for [`ClickEvent`] records.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn log_click(&self, event: ClickEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO click_events (
                alias, node_id, ip_address, country, city, os, device, browser,
                is_bot, bot_type, is_vpn, is_tor, is_proxy, fraud_score, risk_score,
                ip_check_provider, user_agent, referer, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(event.alias)
        .bind(event.node_id)
        .bind(event.ip_address)
        .bind(event.country)
        .bind(event.city)
        .bind(event.os)
        .bind(event.device)
        .bind(event.browser)
        .bind(event.is_bot)
        .bind(event.bot_type)
        .bind(event.is_vpn)
        .bind(event.is_tor)
        .bind(event.is_proxy)
        .bind(event.fraud_score)
        .bind(event.risk_score)
        .bind(event.ip_check_provider)
        .bind(event.user_agent)
        .bind(event.referer)
        .bind(event.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
