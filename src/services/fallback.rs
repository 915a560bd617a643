use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::market::{ChartRange, MarketSort};
use crate::services::provider::{
    CoinDetailsDto, ExchangeDto, GlobalDto, MarketCategoryDto, MarketCategoryStatsDto,
    MarketChartDto, MarketDataProvider, MarketDto, TrendingResponseDto,
};

/// Composes the primary and secondary providers.
///
/// Endpoints the secondary supports (global, categories, category stats,
/// exchanges) are replayed against it when the primary fails with a rate
/// limit or 400/401/403; every other failure class, and every endpoint the
/// secondary cannot serve, propagates the primary's error untouched.
pub struct FallbackMarketService {
    primary: Arc<dyn MarketDataProvider>,
    secondary: Option<Arc<dyn MarketDataProvider>>,
}

impl FallbackMarketService {
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        secondary: Option<Arc<dyn MarketDataProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    fn should_fallback(error: &NetworkError) -> bool {
        match error {
            NetworkError::RateLimited { .. } => true,
            NetworkError::Server { status } => matches!(status, 400 | 401 | 403),
            _ => false,
        }
    }

    fn secondary_for(&self, error: &NetworkError) -> Option<&Arc<dyn MarketDataProvider>> {
        if Self::should_fallback(error) {
            self.secondary.as_ref()
        } else {
            None
        }
    }
}

#[async_trait]
impl MarketDataProvider for FallbackMarketService {
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        sort: MarketSort,
        category: Option<&str>,
    ) -> Result<Vec<MarketDto>, NetworkError> {
        self.primary
            .fetch_markets(page, per_page, sort, category)
            .await
    }

    async fn fetch_details(&self, coin_id: &str) -> Result<CoinDetailsDto, NetworkError> {
        self.primary.fetch_details(coin_id).await
    }

    async fn fetch_chart(
        &self,
        coin_id: &str,
        range: ChartRange,
    ) -> Result<MarketChartDto, NetworkError> {
        self.primary.fetch_chart(coin_id, range).await
    }

    async fn fetch_trending(&self) -> Result<TrendingResponseDto, NetworkError> {
        self.primary.fetch_trending().await
    }

    async fn fetch_global(&self) -> Result<GlobalDto, NetworkError> {
        match self.primary.fetch_global().await {
            Ok(value) => Ok(value),
            Err(error) => match self.secondary_for(&error) {
                Some(secondary) => secondary.fetch_global().await,
                None => Err(error),
            },
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<MarketCategoryDto>, NetworkError> {
        match self.primary.fetch_categories().await {
            Ok(value) => Ok(value),
            Err(error) => match self.secondary_for(&error) {
                Some(secondary) => secondary.fetch_categories().await,
                None => Err(error),
            },
        }
    }

    async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStatsDto>, NetworkError> {
        match self.primary.fetch_category_stats().await {
            Ok(value) => Ok(value),
            Err(error) => match self.secondary_for(&error) {
                Some(secondary) => secondary.fetch_category_stats().await,
                None => Err(error),
            },
        }
    }

    async fn fetch_exchanges(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ExchangeDto>, NetworkError> {
        match self.primary.fetch_exchanges(page, per_page).await {
            Ok(value) => Ok(value),
            Err(error) => match self.secondary_for(&error) {
                Some(secondary) => secondary.fetch_exchanges(page, per_page).await,
                None => Err(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_classes() {
        assert!(FallbackMarketService::should_fallback(
            &NetworkError::RateLimited { retry_after: None }
        ));
        for status in [400, 401, 403] {
            assert!(FallbackMarketService::should_fallback(
                &NetworkError::Server { status }
            ));
        }
        assert!(!FallbackMarketService::should_fallback(
            &NetworkError::Server { status: 500 }
        ));
        assert!(!FallbackMarketService::should_fallback(
            &NetworkError::Offline
        ));
    }
}
