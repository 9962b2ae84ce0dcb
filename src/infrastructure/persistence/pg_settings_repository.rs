//! PostgreSQL implementation of the settings registry.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Settings;
use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;

/// Reads the singleton row (`id = 1`) of the `settings` table.
pub struct PgSettingsRepository {
    pool: Arc<PgPool>,
}

impl PgSettingsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    enable_proxy_check: bool,
    proxy_check_api_key: String,
    enable_ip_quality_score: bool,
    ip_quality_score_api_key: String,
    block_vpn: bool,
    block_tor: bool,
    block_proxies: bool,
    block_bots: bool,
    rate_limit_per_ip: i32,
    rate_limit_per_link: i32,
    rate_limit_window_seconds: i32,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        let defaults = Settings::default();
        Self {
            enable_proxy_check: row.enable_proxy_check,
            proxy_check_api_key: row.proxy_check_api_key,
            enable_ip_quality_score: row.enable_ip_quality_score,
            ip_quality_score_api_key: row.ip_quality_score_api_key,
            block_vpn: row.block_vpn,
            block_tor: row.block_tor,
            block_proxies: row.block_proxies,
            block_bots: row.block_bots,
            rate_limit_per_ip: u32::try_from(row.rate_limit_per_ip)
                .unwrap_or(defaults.rate_limit_per_ip),
            rate_limit_per_link: u32::try_from(row.rate_limit_per_link)
                .unwrap_or(defaults.rate_limit_per_link),
            rate_limit_window_seconds: u32::try_from(row.rate_limit_window_seconds)
                .unwrap_or(defaults.rate_limit_window_seconds),
        }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn load(&self) -> Result<Option<Settings>, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT enable_proxy_check, proxy_check_api_key,
                   enable_ip_quality_score, ip_quality_score_api_key,
                   block_vpn, block_tor, block_proxies, block_bots,
                   rate_limit_per_ip, rate_limit_per_link, rate_limit_window_seconds
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Settings::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_limits_fall_back_to_defaults() {
        let row = SettingsRow {
            enable_proxy_check: true,
            proxy_check_api_key: "pc".to_string(),
            enable_ip_quality_score: false,
            ip_quality_score_api_key: String::new(),
            block_vpn: true,
            block_tor: false,
            block_proxies: false,
            block_bots: true,
            rate_limit_per_ip: -1,
            rate_limit_per_link: 30,
            rate_limit_window_seconds: 10,
        };

        let settings = Settings::from(row);
        assert_eq!(settings.rate_limit_per_ip, 60);
        assert_eq!(settings.rate_limit_per_link, 30);
        assert_eq!(settings.rate_limit_window_seconds, 10);
        assert!(settings.enable_proxy_check && settings.block_vpn && settings.block_bots);
    }
}
