use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{cached_charts, cached_coin_details, prelude::*};
use crate::error::NetworkError;
use crate::models::market::{ChartRange, CoinDetails, PricePoint};
use crate::network::dedup::RequestDeduper;
use crate::network::retry;
use crate::services::cache_policy;
use crate::services::provider::MarketDataProvider;

/// Cache-first access to per-coin details and chart series.
#[derive(Clone)]
pub struct CoinRepository {
    db: DatabaseConnection,
    service: Arc<dyn MarketDataProvider>,
    details_deduper: Arc<RequestDeduper<CoinDetails>>,
    chart_deduper: Arc<RequestDeduper<Vec<PricePoint>>>,
}

impl CoinRepository {
    pub fn new(db: DatabaseConnection, service: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            db,
            service,
            details_deduper: Arc::new(RequestDeduper::new()),
            chart_deduper: Arc::new(RequestDeduper::new()),
        }
    }

    pub async fn cached_details(&self, coin_id: &str) -> Option<CoinDetails> {
        match CachedCoinDetails::find_by_id(coin_id).one(&self.db).await {
            Ok(row) => row.map(details_to_domain),
            Err(_) => None,
        }
    }

    pub async fn cached_chart(&self, coin_id: &str, range: ChartRange) -> Vec<PricePoint> {
        match CachedCharts::find_by_id(chart_key(coin_id, range))
            .one(&self.db)
            .await
        {
            Ok(Some(row)) => serde_json::from_str(&row.points).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub async fn is_details_cache_valid(&self, coin_id: &str) -> bool {
        match CachedCoinDetails::find_by_id(coin_id).one(&self.db).await {
            Ok(row) => cache_policy::is_fresh(
                row.map(|details| details.updated_at),
                cache_policy::DETAILS_TTL_SECS,
            ),
            Err(_) => false,
        }
    }

    pub async fn is_chart_cache_valid(&self, coin_id: &str, range: ChartRange) -> bool {
        match CachedCharts::find_by_id(chart_key(coin_id, range))
            .one(&self.db)
            .await
        {
            Ok(row) => cache_policy::is_fresh(
                row.map(|chart| chart.updated_at),
                cache_policy::CHART_TTL_SECS,
            ),
            Err(_) => false,
        }
    }

    pub async fn fetch_details(&self, coin_id: &str) -> Result<CoinDetails, NetworkError> {
        let key = format!("details_{coin_id}");
        retry::run_default(|| {
            self.details_deduper.run(&key, || {
                let service = self.service.clone();
                let db = self.db.clone();
                let coin_id = coin_id.to_string();
                async move {
                    let dto = service.fetch_details(&coin_id).await?;
                    let details = dto.into_domain();
                    store_details(&db, &details).await;
                    Ok(details)
                }
            })
        })
        .await
    }

    pub async fn fetch_chart(
        &self,
        coin_id: &str,
        range: ChartRange,
    ) -> Result<Vec<PricePoint>, NetworkError> {
        let key = format!("chart_{coin_id}_{}", range.as_str());
        retry::run_default(|| {
            self.chart_deduper.run(&key, || {
                let service = self.service.clone();
                let db = self.db.clone();
                let coin_id = coin_id.to_string();
                async move {
                    let dto = service.fetch_chart(&coin_id, range).await?;
                    let points = dto.into_domain();
                    store_chart(&db, &coin_id, range, &points).await;
                    Ok(points)
                }
            })
        })
        .await
    }
}

fn chart_key(coin_id: &str, range: ChartRange) -> String {
    format!("{coin_id}_{}", range.as_str())
}

fn details_to_domain(model: cached_coin_details::Model) -> CoinDetails {
    CoinDetails {
        id: model.coin_id,
        name: model.name,
        symbol: model.symbol,
        description: model.description,
        image_url: model.image_url,
        current_price: model.current_price,
        price_change_percentage_24h: model.price_change_percentage_24h,
        market_cap: model.market_cap,
        total_volume: model.total_volume,
        high_24h: model.high_24h,
        low_24h: model.low_24h,
        circulating_supply: model.circulating_supply,
        last_updated: model.last_updated,
    }
}

async fn store_details(db: &DatabaseConnection, details: &CoinDetails) {
    let row = cached_coin_details::ActiveModel {
        coin_id: Set(details.id.clone()),
        name: Set(details.name.clone()),
        symbol: Set(details.symbol.clone()),
        description: Set(details.description.clone()),
        image_url: Set(details.image_url.clone()),
        current_price: Set(details.current_price),
        price_change_percentage_24h: Set(details.price_change_percentage_24h),
        market_cap: Set(details.market_cap),
        total_volume: Set(details.total_volume),
        high_24h: Set(details.high_24h),
        low_24h: Set(details.low_24h),
        circulating_supply: Set(details.circulating_supply),
        last_updated: Set(details.last_updated),
        updated_at: Set(Utc::now()),
    };
    let result = CachedCoinDetails::insert(row)
        .on_conflict(
            OnConflict::column(cached_coin_details::Column::CoinId)
                .update_columns([
                    cached_coin_details::Column::Name,
                    cached_coin_details::Column::Symbol,
                    cached_coin_details::Column::Description,
                    cached_coin_details::Column::ImageUrl,
                    cached_coin_details::Column::CurrentPrice,
                    cached_coin_details::Column::PriceChangePercentage24h,
                    cached_coin_details::Column::MarketCap,
                    cached_coin_details::Column::TotalVolume,
                    cached_coin_details::Column::High24h,
                    cached_coin_details::Column::Low24h,
                    cached_coin_details::Column::CirculatingSupply,
                    cached_coin_details::Column::LastUpdated,
                    cached_coin_details::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await;
    if let Err(error) = result {
        tracing::warn!("Failed to store details: {error}");
    }
}

async fn store_chart(
    db: &DatabaseConnection,
    coin_id: &str,
    range: ChartRange,
    points: &[PricePoint],
) {
    let encoded = match serde_json::to_string(points) {
        Ok(encoded) => encoded,
        Err(error) => {
            tracing::warn!("Failed to encode chart points: {error}");
            return;
        }
    };
    let row = cached_charts::ActiveModel {
        chart_key: Set(chart_key(coin_id, range)),
        coin_id: Set(coin_id.to_string()),
        range: Set(range.as_str().to_string()),
        points: Set(encoded),
        updated_at: Set(Utc::now()),
    };
    let result = CachedCharts::insert(row)
        .on_conflict(
            OnConflict::column(cached_charts::Column::ChartKey)
                .update_columns([
                    cached_charts::Column::Points,
                    cached_charts::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await;
    if let Err(error) = result {
        tracing::warn!("Failed to store chart: {error}");
    }
}
