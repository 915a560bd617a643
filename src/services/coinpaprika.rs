use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Deserialize;

use crate::error::NetworkError;
use crate::models::market::{ChartRange, MarketSort};
use crate::network::client::NetworkClient;
use crate::services::provider::{
    CoinDetailsDto, ExchangeDto, GlobalDataDto, GlobalDto, MarketCategoryDto,
    MarketCategoryStatsDto, MarketChartDto, MarketDataProvider, MarketDto, TrendingResponseDto,
};

const TAGS_TTL: Duration = Duration::from_secs(30 * 60);
const EXCHANGES_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Deserialize)]
struct PaprikaGlobalDto {
    market_cap_usd: Option<f64>,
    volume_24h_usd: Option<f64>,
    bitcoin_dominance_percentage: Option<f64>,
    ethereum_dominance_percentage: Option<f64>,
    cryptocurrencies_number: Option<i64>,
    markets_number: Option<i64>,
    market_cap_change_24h: Option<f64>,
    last_updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PaprikaTagDto {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PaprikaExchangeDto {
    id: String,
    name: String,
    links: Option<PaprikaLinksDto>,
    adjusted_rank: Option<i64>,
    reported_rank: Option<i64>,
    quotes: Option<PaprikaQuotesDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct PaprikaLinksDto {
    website: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PaprikaQuotesDto {
    #[serde(rename = "USD")]
    usd: Option<PaprikaQuoteDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct PaprikaQuoteDto {
    reported_volume_24h: Option<f64>,
}

/// Secondary market-data provider.
///
/// Covers global snapshot, categories (tags), and exchanges, normalized to
/// the primary provider's shapes; every other endpoint answers with the
/// canonical not-implemented failure. Tag and exchange listings are
/// unpaged upstream, so they are cached in-process and sliced locally.
#[derive(Clone)]
pub struct CoinPaprikaService {
    client: NetworkClient,
    tags_cache: Arc<Cache<&'static str, Vec<PaprikaTagDto>>>,
    exchanges_cache: Arc<Cache<&'static str, Vec<PaprikaExchangeDto>>>,
}

impl CoinPaprikaService {
    pub fn new(client: NetworkClient) -> Self {
        let tags_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(TAGS_TTL)
            .build();
        let exchanges_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(EXCHANGES_TTL)
            .build();
        Self {
            client,
            tags_cache: Arc::new(tags_cache),
            exchanges_cache: Arc::new(exchanges_cache),
        }
    }

    async fn fetch_tags(&self) -> Result<Vec<PaprikaTagDto>, NetworkError> {
        if let Some(cached) = self.tags_cache.get("tags").await {
            return Ok(cached);
        }
        let tags: Vec<PaprikaTagDto> = self.client.get_json("/v1/tags", &[]).await?;
        self.tags_cache.insert("tags", tags.clone()).await;
        Ok(tags)
    }

    async fn fetch_exchange_list(&self) -> Result<Vec<PaprikaExchangeDto>, NetworkError> {
        if let Some(cached) = self.exchanges_cache.get("exchanges").await {
            return Ok(cached);
        }
        let exchanges: Vec<PaprikaExchangeDto> = self.client.get_json("/v1/exchanges", &[]).await?;
        self.exchanges_cache
            .insert("exchanges", exchanges.clone())
            .await;
        Ok(exchanges)
    }

    fn unsupported<T>() -> Result<T, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }
}

#[async_trait]
impl MarketDataProvider for CoinPaprikaService {
    async fn fetch_markets(
        &self,
        _page: u32,
        _per_page: u32,
        _sort: MarketSort,
        _category: Option<&str>,
    ) -> Result<Vec<MarketDto>, NetworkError> {
        Self::unsupported()
    }

    async fn fetch_details(&self, _coin_id: &str) -> Result<CoinDetailsDto, NetworkError> {
        Self::unsupported()
    }

    async fn fetch_chart(
        &self,
        _coin_id: &str,
        _range: ChartRange,
    ) -> Result<MarketChartDto, NetworkError> {
        Self::unsupported()
    }

    async fn fetch_trending(&self) -> Result<TrendingResponseDto, NetworkError> {
        Self::unsupported()
    }

    async fn fetch_global(&self) -> Result<GlobalDto, NetworkError> {
        let dto: PaprikaGlobalDto = self.client.get_json("/v1/global", &[]).await?;
        let updated_at = dto
            .last_updated
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc).timestamp());

        let mut dominance = HashMap::new();
        if let Some(btc) = dto.bitcoin_dominance_percentage {
            dominance.insert("btc".to_string(), btc);
        }
        if let Some(eth) = dto.ethereum_dominance_percentage {
            dominance.insert("eth".to_string(), eth);
        }

        Ok(GlobalDto {
            data: GlobalDataDto {
                active_cryptocurrencies: dto.cryptocurrencies_number,
                markets: dto.markets_number,
                total_market_cap: dto
                    .market_cap_usd
                    .map(|usd| HashMap::from([("usd".to_string(), usd)])),
                total_volume: dto
                    .volume_24h_usd
                    .map(|usd| HashMap::from([("usd".to_string(), usd)])),
                market_cap_percentage: (!dominance.is_empty()).then_some(dominance),
                market_cap_change_percentage_24h_usd: dto.market_cap_change_24h,
                updated_at,
            },
        })
    }

    async fn fetch_categories(&self) -> Result<Vec<MarketCategoryDto>, NetworkError> {
        let tags = self.fetch_tags().await?;
        Ok(tags
            .into_iter()
            .map(|tag| MarketCategoryDto {
                category_id: format!("paprika:{}", tag.id),
                name: tag.name,
            })
            .collect())
    }

    async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStatsDto>, NetworkError> {
        // Tags carry no market-cap aggregates; only the identity fields map.
        let tags = self.fetch_tags().await?;
        Ok(tags
            .into_iter()
            .map(|tag| MarketCategoryStatsDto {
                id: format!("paprika:{}", tag.id),
                name: tag.name,
                market_cap: None,
                market_cap_change_24h: None,
                volume_24h: None,
                top_3_coins: None,
                updated_at: None,
            })
            .collect())
    }

    async fn fetch_exchanges(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ExchangeDto>, NetworkError> {
        let all = self.fetch_exchange_list().await?;
        let start = page.saturating_sub(1) as usize * per_page as usize;
        if start >= all.len() {
            return Ok(Vec::new());
        }
        let end = (start + per_page as usize).min(all.len());
        Ok(all[start..end]
            .iter()
            .map(|exchange| ExchangeDto {
                id: exchange.id.clone(),
                name: exchange.name.clone(),
                image: None,
                country: None,
                year_established: None,
                trust_score_rank: exchange.adjusted_rank.or(exchange.reported_rank),
                trade_volume_24h_btc: exchange
                    .quotes
                    .as_ref()
                    .and_then(|quotes| quotes.usd.as_ref())
                    .and_then(|quote| quote.reported_volume_24h),
                url: exchange
                    .links
                    .as_ref()
                    .and_then(|links| links.website.as_ref())
                    .and_then(|sites| sites.first().cloned()),
            })
            .collect())
    }
}
