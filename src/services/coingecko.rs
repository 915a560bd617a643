use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::market::{ChartRange, MarketSort};
use crate::network::client::NetworkClient;
use crate::services::provider::{
    CoinDetailsDto, ExchangeDto, GlobalDto, MarketCategoryDto, MarketCategoryStatsDto,
    MarketChartDto, MarketDataProvider, MarketDto, TrendingResponseDto,
};

/// Primary market-data provider.
#[derive(Clone)]
pub struct CoinGeckoService {
    client: NetworkClient,
}

impl CoinGeckoService {
    pub fn new(client: NetworkClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoService {
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        sort: MarketSort,
        category: Option<&str>,
    ) -> Result<Vec<MarketDto>, NetworkError> {
        let mut query = vec![
            ("vs_currency", "usd".to_string()),
            ("order", sort.api_order().to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
            ("price_change_percentage", "24h".to_string()),
            ("sparkline", "false".to_string()),
        ];
        if let Some(category) = category.filter(|value| !value.is_empty()) {
            query.push(("category", category.to_string()));
        }
        self.client.get_json("/api/v3/coins/markets", &query).await
    }

    async fn fetch_details(&self, coin_id: &str) -> Result<CoinDetailsDto, NetworkError> {
        let query = vec![
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
            ("sparkline", "false".to_string()),
        ];
        self.client
            .get_json(&format!("/api/v3/coins/{coin_id}"), &query)
            .await
    }

    async fn fetch_chart(
        &self,
        coin_id: &str,
        range: ChartRange,
    ) -> Result<MarketChartDto, NetworkError> {
        let query = vec![
            ("vs_currency", "usd".to_string()),
            ("days", range.days_query_value().to_string()),
        ];
        self.client
            .get_json(&format!("/api/v3/coins/{coin_id}/market_chart"), &query)
            .await
    }

    async fn fetch_trending(&self) -> Result<TrendingResponseDto, NetworkError> {
        self.client.get_json("/api/v3/search/trending", &[]).await
    }

    async fn fetch_global(&self) -> Result<GlobalDto, NetworkError> {
        self.client.get_json("/api/v3/global", &[]).await
    }

    async fn fetch_categories(&self) -> Result<Vec<MarketCategoryDto>, NetworkError> {
        self.client
            .get_json("/api/v3/coins/categories/list", &[])
            .await
    }

    async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStatsDto>, NetworkError> {
        self.client.get_json("/api/v3/coins/categories", &[]).await
    }

    async fn fetch_exchanges(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ExchangeDto>, NetworkError> {
        let query = vec![
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.client.get_json("/api/v3/exchanges", &query).await
    }
}
