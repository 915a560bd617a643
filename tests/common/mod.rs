#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use marketpulse_backend::entities::{cached_markets, prelude::CachedMarkets};
use marketpulse_backend::error::NetworkError;
use marketpulse_backend::models::market::{ChartRange, MarketSort};
use marketpulse_backend::services::notifier::Notifier;
use marketpulse_backend::services::provider::{
    CoinDetailsDto, ExchangeDto, GlobalDataDto, GlobalDto, MarketCategoryDto,
    MarketCategoryStatsDto, MarketChartDto, MarketDataProvider, MarketDto, TrendingResponseDto,
};

pub async fn setup_test_db() -> DatabaseConnection {
    // One pooled connection, or every pool checkout would see its own
    // empty in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to test DB");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");
    db
}

pub fn market_dto(id: &str, name: &str, price: f64, market_cap: f64, change: f64) -> MarketDto {
    MarketDto {
        id: id.to_string(),
        name: name.to_string(),
        symbol: id.to_uppercase(),
        image: None,
        current_price: Some(price),
        price_change_percentage_24h: Some(change),
        market_cap: Some(market_cap),
        total_volume: None,
        high_24h: None,
        low_24h: None,
        last_updated: None,
    }
}

pub fn global_dto(total_market_cap_usd: f64) -> GlobalDto {
    GlobalDto {
        data: GlobalDataDto {
            active_cryptocurrencies: Some(10_000),
            markets: Some(800),
            total_market_cap: Some(HashMap::from([("usd".to_string(), total_market_cap_usd)])),
            total_volume: None,
            market_cap_percentage: None,
            market_cap_change_percentage_24h_usd: None,
            updated_at: None,
        },
    }
}

/// Directly seeds one cached market row, bypassing the repository.
pub async fn seed_market(db: &DatabaseConnection, coin_id: &str, price: f64, change: f64) {
    let row = cached_markets::ActiveModel {
        coin_id: Set(coin_id.to_string()),
        name: Set(coin_id.to_string()),
        symbol: Set(coin_id.to_uppercase()),
        image_url: Set(None),
        current_price: Set(price),
        price_change_percentage_24h: Set(change),
        market_cap: Set(None),
        total_volume: Set(None),
        high_24h: Set(None),
        low_24h: Set(None),
        last_updated: Set(None),
        updated_at: Set(Utc::now()),
    };
    CachedMarkets::insert(row)
        .exec(db)
        .await
        .expect("Failed to seed market row");
}

/// Scripted provider double.
///
/// Market pages are served from `markets_pages`; queued errors in
/// `markets_errors` are drained first, one per call. Endpoints without
/// scripted data answer like the secondary provider does for unsupported
/// operations.
#[derive(Default)]
pub struct MockProvider {
    pub markets_pages: Mutex<HashMap<u32, Vec<MarketDto>>>,
    pub category_markets: Mutex<Vec<MarketDto>>,
    pub markets_errors: Mutex<VecDeque<NetworkError>>,
    pub markets_calls: AtomicU32,
    pub markets_delay: Mutex<Duration>,
    pub global: Mutex<Option<GlobalDto>>,
    pub global_errors: Mutex<VecDeque<NetworkError>>,
    pub global_calls: AtomicU32,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, page: u32, dtos: Vec<MarketDto>) {
        self.markets_pages.lock().insert(page, dtos);
    }

    pub fn queue_markets_error(&self, error: NetworkError) {
        self.markets_errors.lock().push_back(error);
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_markets(
        &self,
        page: u32,
        _per_page: u32,
        _sort: MarketSort,
        category: Option<&str>,
    ) -> Result<Vec<MarketDto>, NetworkError> {
        self.markets_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.markets_delay.lock();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.markets_errors.lock().pop_front() {
            return Err(error);
        }
        if category.is_some() {
            return Ok(self.category_markets.lock().clone());
        }
        Ok(self
            .markets_pages
            .lock()
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_details(&self, _coin_id: &str) -> Result<CoinDetailsDto, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }

    async fn fetch_chart(
        &self,
        _coin_id: &str,
        _range: ChartRange,
    ) -> Result<MarketChartDto, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }

    async fn fetch_trending(&self) -> Result<TrendingResponseDto, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }

    async fn fetch_global(&self) -> Result<GlobalDto, NetworkError> {
        self.global_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.global_errors.lock().pop_front() {
            return Err(error);
        }
        self.global
            .lock()
            .clone()
            .ok_or(NetworkError::Server { status: 501 })
    }

    async fn fetch_categories(&self) -> Result<Vec<MarketCategoryDto>, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }

    async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStatsDto>, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }

    async fn fetch_exchanges(
        &self,
        _page: u32,
        _per_page: u32,
    ) -> Result<Vec<ExchangeDto>, NetworkError> {
        Err(NetworkError::Server { status: 501 })
    }
}

/// Captures notifications instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, title: &str, body: &str) {
        self.sent.lock().push((title.to_string(), body.to_string()));
    }
}
