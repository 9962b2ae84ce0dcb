//! PostgreSQL implementation of the webhook subscriber registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Webhook;
use crate::domain::repositories::WebhookRepository;
use crate::error::AppError;

pub struct PgWebhookRepository {
    pool: Arc<PgPool>,
}

impl PgWebhookRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WebhookRow {
    id: String,
    url: String,
    events: Vec<String>,
    secret: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl WebhookRepository for PgWebhookRepository {
    async fn list_active_for_event(&self, event: &str) -> Result<Vec<Webhook>, AppError> {
        let rows = sqlx::query_as::<_, WebhookRow>(
            r#"
            SELECT id, url, events, secret, is_active, created_at, updated_at
            FROM webhooks
            WHERE is_active AND $1 = ANY(events)
            ORDER BY created_at
            "#,
        )
        .bind(event)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Webhook {
                id: r.id,
                url: r.url,
                events: r.events,
                secret: r.secret,
                is_active: r.is_active,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }
}
