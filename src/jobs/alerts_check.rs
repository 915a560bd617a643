use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::models::market::MarketSort;
use crate::repositories::market::MarketRepository;
use crate::services::alerts_checker::AlertsChecker;

const REFRESH_PAGE_SIZE: u32 = 100;

/// Background alert evaluation loop.
///
/// Each tick refreshes page 1 of the markets table when the dataset is
/// stale, then re-evaluates every alert against the cached snapshot. A
/// failed refresh is tolerated: evaluation proceeds on whatever the cache
/// holds.
pub fn start_alerts_check_job(
    market_repository: MarketRepository,
    checker: Arc<AlertsChecker>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));

        loop {
            ticker.tick().await;

            if !market_repository.is_markets_cache_valid().await {
                if let Err(error) = market_repository
                    .fetch_markets(1, REFRESH_PAGE_SIZE, MarketSort::MarketCapDesc, None)
                    .await
                {
                    tracing::warn!("Markets refresh failed before alert check: {error}");
                }
            }

            checker.check_and_notify().await;
        }
    });
}
