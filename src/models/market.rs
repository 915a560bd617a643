use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the market list. Identity is `id`; rows are only ever
/// replaced wholesale via upsert, never field-patched from two sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetails {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_url: Option<String>,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One chart sample. `timestamp_ms` is upstream's millisecond epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRange {
    OneDay,
    SevenDays,
    OneMonth,
    ThreeMonths,
    OneYear,
    All,
}

impl ChartRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::SevenDays => "7d",
            ChartRange::OneMonth => "1m",
            ChartRange::ThreeMonths => "3m",
            ChartRange::OneYear => "1y",
            ChartRange::All => "all",
        }
    }

    pub fn from_str(value: &str) -> Option<ChartRange> {
        match value {
            "1d" => Some(ChartRange::OneDay),
            "7d" => Some(ChartRange::SevenDays),
            "1m" => Some(ChartRange::OneMonth),
            "3m" => Some(ChartRange::ThreeMonths),
            "1y" => Some(ChartRange::OneYear),
            "all" => Some(ChartRange::All),
            _ => None,
        }
    }

    /// `days` query value understood by the upstream chart endpoint.
    pub fn days_query_value(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1",
            ChartRange::SevenDays => "7",
            ChartRange::OneMonth => "30",
            ChartRange::ThreeMonths => "90",
            ChartRange::OneYear => "365",
            ChartRange::All => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSort {
    MarketCapDesc,
    PriceDesc,
    ChangeDesc,
    Alphabetical,
}

impl MarketSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSort::MarketCapDesc => "market_cap_desc",
            MarketSort::PriceDesc => "price_desc",
            MarketSort::ChangeDesc => "change_desc",
            MarketSort::Alphabetical => "alphabetical",
        }
    }

    pub fn from_str(value: &str) -> Option<MarketSort> {
        match value {
            "market_cap_desc" => Some(MarketSort::MarketCapDesc),
            "price_desc" => Some(MarketSort::PriceDesc),
            "change_desc" => Some(MarketSort::ChangeDesc),
            "alphabetical" => Some(MarketSort::Alphabetical),
            _ => None,
        }
    }

    /// The upstream list endpoint only reliably supports market-cap order;
    /// every other sort is applied client-side after the fetch.
    pub fn api_order(&self) -> &'static str {
        "market_cap_desc"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarket {
    pub total_market_cap_usd: Option<f64>,
    pub total_volume_usd: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,
    pub btc_dominance: Option<f64>,
    pub eth_dominance: Option<f64>,
    pub active_cryptocurrencies: Option<i64>,
    pub markets: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    pub market_cap_rank: Option<i64>,
    pub price_btc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCategory {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCategoryStats {
    pub id: String,
    pub name: String,
    pub market_cap: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub top_3_coin_image_urls: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub country: Option<String>,
    pub year_established: Option<i64>,
    pub trust_score_rank: Option<i64>,
    pub trade_volume_24h_btc: Option<f64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub avg_buy_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinNote {
    pub id: String,
    pub coin_id: String,
    pub coin_name: String,
    pub coin_symbol: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub id: String,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub usd_amount: f64,
    pub coin_amount: f64,
    pub created_at: DateTime<Utc>,
}
