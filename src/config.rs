use std::env;

/// Environment-driven configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub coingecko_base_url: String,
    /// Alternate base URL for the same provider (mirror/proxy). Tried once
    /// when the primary endpoint rate-limits or rejects the key.
    pub coingecko_fallback_base_url: Option<String>,
    pub coingecko_api_key: String,
    pub coinpaprika_base_url: String,
    pub disk_cache_dir: String,
    pub bind_addr: String,
    pub alerts_check_interval_secs: u64,
    pub alerts_default_cooldown_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let coingecko_base_url = env::var("COINGECKO_BASE_URL")
            .unwrap_or_else(|_| "https://api.coingecko.com".to_string());
        let coingecko_fallback_base_url = env::var("COINGECKO_FALLBACK_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty() && *url != coingecko_base_url);
        let coingecko_api_key = env::var("COINGECKO_API_KEY").unwrap_or_default();
        if coingecko_api_key.is_empty() {
            tracing::warn!("COINGECKO_API_KEY is not set; requests go out unauthenticated");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://marketpulse.db?mode=rwc".to_string()),
            coingecko_base_url,
            coingecko_fallback_base_url,
            coingecko_api_key,
            coinpaprika_base_url: env::var("COINPAPRIKA_BASE_URL")
                .unwrap_or_else(|_| "https://api.coinpaprika.com".to_string()),
            disk_cache_dir: env::var("DISK_CACHE_DIR")
                .unwrap_or_else(|_| "marketpulse_cache".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            alerts_check_interval_secs: env::var("ALERTS_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            alerts_default_cooldown_minutes: env::var("ALERTS_DEFAULT_COOLDOWN_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
