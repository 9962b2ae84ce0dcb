//! Runtime-tunable admission policy.

/// Global policy record read by the pipeline and the rate-limit middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub enable_proxy_check: bool,
    pub proxy_check_api_key: String,
    pub enable_ip_quality_score: bool,
    pub ip_quality_score_api_key: String,
    pub block_vpn: bool,
    pub block_tor: bool,
    pub block_proxies: bool,
    pub block_bots: bool,
    pub rate_limit_per_ip: u32,
    pub rate_limit_per_link: u32,
    pub rate_limit_window_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_proxy_check: false,
            proxy_check_api_key: String::new(),
            enable_ip_quality_score: false,
            ip_quality_score_api_key: String::new(),
            block_vpn: false,
            block_tor: false,
            block_proxies: false,
            block_bots: false,
            rate_limit_per_ip: 60,
            rate_limit_per_link: 120,
            rate_limit_window_seconds: 60,
        }
    }
}

impl Settings {
    /// Sliding window length; never shorter than one second.
    pub fn rate_limit_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.rate_limit_window_seconds.max(1)))
    }
}
