// src/lib.rs

use sea_orm::DatabaseConnection;

use repositories::{
    alerts::AlertsRepository, coin::CoinRepository, conversion::ConversionHistoryRepository,
    favorites::FavoritesRepository, market::MarketRepository, notes::NotesRepository,
    portfolio::PortfolioRepository, search::SearchRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub market_repository: MarketRepository,
    pub coin_repository: CoinRepository,
    pub alerts_repository: AlertsRepository,
    pub favorites_repository: FavoritesRepository,
    pub portfolio_repository: PortfolioRepository,
    pub notes_repository: NotesRepository,
    pub search_repository: SearchRepository,
    pub conversion_repository: ConversionHistoryRepository,
}

pub mod entities {
    pub mod prelude;

    pub mod cache_meta;
    pub mod cached_charts;
    pub mod cached_coin_details;
    pub mod cached_markets;
    pub mod coin_notes;
    pub mod conversion_records;
    pub mod favorites;
    pub mod holdings;
    pub mod price_alerts;
    pub mod recent_searches;
}

pub mod services {
    pub mod alerts_checker;
    pub mod alerts_evaluator;
    pub mod cache_policy;
    pub mod coingecko;
    pub mod coinpaprika;
    pub mod disk_cache;
    pub mod fallback;
    pub mod notifier;
    pub mod provider;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod network;
pub mod repositories;
