use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::NetworkError;
use crate::models::market::{
    ChartRange, CoinDetails, CoinMarket, Exchange, GlobalMarket, MarketCategory,
    MarketCategoryStats, MarketSort, PricePoint, TrendingCoin,
};

/// Uniform interface over the upstream market-data providers.
///
/// The primary provider implements all of it; the secondary covers only
/// global/categories/exchanges and answers everything else with the
/// canonical not-implemented failure `Server { status: 501 }`.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        sort: MarketSort,
        category: Option<&str>,
    ) -> Result<Vec<MarketDto>, NetworkError>;

    async fn fetch_details(&self, coin_id: &str) -> Result<CoinDetailsDto, NetworkError>;

    async fn fetch_chart(
        &self,
        coin_id: &str,
        range: ChartRange,
    ) -> Result<MarketChartDto, NetworkError>;

    async fn fetch_trending(&self) -> Result<TrendingResponseDto, NetworkError>;

    async fn fetch_global(&self) -> Result<GlobalDto, NetworkError>;

    async fn fetch_categories(&self) -> Result<Vec<MarketCategoryDto>, NetworkError>;

    async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStatsDto>, NetworkError>;

    async fn fetch_exchanges(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ExchangeDto>, NetworkError>;
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDto {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub last_updated: Option<String>,
}

impl MarketDto {
    pub fn into_domain(self) -> CoinMarket {
        let last_updated = parse_timestamp(self.last_updated.as_deref());
        CoinMarket {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            image_url: self.image,
            current_price: self.current_price.unwrap_or(0.0),
            price_change_percentage_24h: self.price_change_percentage_24h.unwrap_or(0.0),
            market_cap: self.market_cap,
            total_volume: self.total_volume,
            high_24h: self.high_24h,
            low_24h: self.low_24h,
            last_updated,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetailsDto {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub description: DescriptionDto,
    pub image: ImageDto,
    pub market_data: MarketDataDto,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionDto {
    pub en: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataDto {
    pub current_price: CurrencyDto,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap: CurrencyDto,
    pub total_volume: CurrencyDto,
    pub high_24h: CurrencyDto,
    pub low_24h: CurrencyDto,
    pub circulating_supply: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyDto {
    pub usd: Option<f64>,
}

impl CoinDetailsDto {
    pub fn into_domain(self) -> CoinDetails {
        let last_updated = parse_timestamp(self.last_updated.as_deref());
        CoinDetails {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            description: self.description.en.unwrap_or_default(),
            image_url: self.image.large,
            current_price: self.market_data.current_price.usd.unwrap_or(0.0),
            price_change_percentage_24h: self
                .market_data
                .price_change_percentage_24h
                .unwrap_or(0.0),
            market_cap: self.market_data.market_cap.usd,
            total_volume: self.market_data.total_volume.usd,
            high_24h: self.market_data.high_24h.usd,
            low_24h: self.market_data.low_24h.usd,
            circulating_supply: self.market_data.circulating_supply,
            last_updated,
        }
    }
}

/// Chart series as `[timestamp_ms, value]` pairs; market caps and volumes
/// line up with prices by index when present.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartDto {
    pub prices: Vec<[f64; 2]>,
    pub market_caps: Option<Vec<[f64; 2]>>,
    pub total_volumes: Option<Vec<[f64; 2]>>,
}

impl MarketChartDto {
    pub fn into_domain(self) -> Vec<PricePoint> {
        self.prices
            .iter()
            .enumerate()
            .map(|(index, pair)| PricePoint {
                timestamp_ms: pair[0] as i64,
                price: pair[1],
                market_cap: self
                    .market_caps
                    .as_ref()
                    .and_then(|caps| caps.get(index))
                    .map(|pair| pair[1]),
                volume: self
                    .total_volumes
                    .as_ref()
                    .and_then(|volumes| volumes.get(index))
                    .map(|pair| pair[1]),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponseDto {
    pub coins: Vec<TrendingItemDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingItemDto {
    pub item: TrendingCoinDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingCoinDto {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub small: Option<String>,
    pub market_cap_rank: Option<i64>,
    pub price_btc: Option<f64>,
}

impl TrendingResponseDto {
    pub fn into_domain(self) -> Vec<TrendingCoin> {
        self.coins
            .into_iter()
            .map(|entry| TrendingCoin {
                id: entry.item.id,
                name: entry.item.name,
                symbol: entry.item.symbol,
                image_url: entry.item.small,
                market_cap_rank: entry.item.market_cap_rank,
                price_btc: entry.item.price_btc,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalDto {
    pub data: GlobalDataDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalDataDto {
    pub active_cryptocurrencies: Option<i64>,
    pub markets: Option<i64>,
    pub total_market_cap: Option<std::collections::HashMap<String, f64>>,
    pub total_volume: Option<std::collections::HashMap<String, f64>>,
    pub market_cap_percentage: Option<std::collections::HashMap<String, f64>>,
    pub market_cap_change_percentage_24h_usd: Option<f64>,
    pub updated_at: Option<i64>,
}

impl GlobalDto {
    pub fn into_domain(self) -> GlobalMarket {
        let data = self.data;
        GlobalMarket {
            total_market_cap_usd: data
                .total_market_cap
                .as_ref()
                .and_then(|caps| caps.get("usd").copied()),
            total_volume_usd: data
                .total_volume
                .as_ref()
                .and_then(|volumes| volumes.get("usd").copied()),
            market_cap_change_percentage_24h: data.market_cap_change_percentage_24h_usd,
            btc_dominance: data
                .market_cap_percentage
                .as_ref()
                .and_then(|dominance| dominance.get("btc").copied()),
            eth_dominance: data
                .market_cap_percentage
                .as_ref()
                .and_then(|dominance| dominance.get("eth").copied()),
            active_cryptocurrencies: data.active_cryptocurrencies,
            markets: data.markets,
            updated_at: data
                .updated_at
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketCategoryDto {
    pub category_id: String,
    pub name: String,
}

impl MarketCategoryDto {
    pub fn into_domain(self) -> MarketCategory {
        MarketCategory {
            id: self.category_id,
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketCategoryStatsDto {
    pub id: String,
    pub name: String,
    pub market_cap: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub top_3_coins: Option<Vec<String>>,
    pub updated_at: Option<String>,
}

impl MarketCategoryStatsDto {
    pub fn into_domain(self) -> MarketCategoryStats {
        let updated_at = parse_timestamp(self.updated_at.as_deref());
        MarketCategoryStats {
            id: self.id,
            name: self.name,
            market_cap: self.market_cap,
            market_cap_change_24h: self.market_cap_change_24h,
            volume_24h: self.volume_24h,
            top_3_coin_image_urls: self.top_3_coins.unwrap_or_default(),
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeDto {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub country: Option<String>,
    pub year_established: Option<i64>,
    pub trust_score_rank: Option<i64>,
    pub trade_volume_24h_btc: Option<f64>,
    pub url: Option<String>,
}

impl ExchangeDto {
    pub fn into_domain(self) -> Exchange {
        Exchange {
            id: self.id,
            name: self.name,
            image_url: self.image,
            country: self.country,
            year_established: self.year_established,
            trust_score_rank: self.trust_score_rank,
            trade_volume_24h_btc: self.trade_volume_24h_btc,
            url: self.url,
        }
    }
}
