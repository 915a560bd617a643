use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};

use crate::entities::{cache_meta, cached_markets, prelude::*};
use crate::error::NetworkError;
use crate::models::market::{
    CoinMarket, Exchange, GlobalMarket, MarketCategory, MarketCategoryStats, MarketSort,
    TrendingCoin,
};
use crate::network::dedup::RequestDeduper;
use crate::network::retry;
use crate::services::cache_policy;
use crate::services::disk_cache::DiskCache;
use crate::services::provider::MarketDataProvider;

const MARKETS_META_KEY: &str = "markets";

/// Cache-first access to the market list and the blob-cached datasets
/// (trending, global, categories, exchanges).
///
/// Page 1 of an uncategorized fetch is the authoritative snapshot: it
/// replaces the whole cached_markets table and bumps the dataset timestamp
/// in one transaction. Later pages merge in row by row. Category-scoped
/// fetches never touch the table.
#[derive(Clone)]
pub struct MarketRepository {
    db: DatabaseConnection,
    service: Arc<dyn MarketDataProvider>,
    disk_cache: Arc<DiskCache>,
    market_deduper: Arc<RequestDeduper<Vec<CoinMarket>>>,
}

impl MarketRepository {
    pub fn new(
        db: DatabaseConnection,
        service: Arc<dyn MarketDataProvider>,
        disk_cache: Arc<DiskCache>,
    ) -> Self {
        Self {
            db,
            service,
            disk_cache,
            market_deduper: Arc::new(RequestDeduper::new()),
        }
    }

    /// Never fails: store errors degrade to an empty list.
    pub async fn cached_markets(&self, sort: MarketSort) -> Vec<CoinMarket> {
        match CachedMarkets::find().all(&self.db).await {
            Ok(rows) => Self::sort_markets(rows.into_iter().map(market_to_domain).collect(), sort),
            Err(error) => {
                tracing::warn!("Failed to read cached markets: {error}");
                Vec::new()
            }
        }
    }

    pub async fn is_markets_cache_valid(&self) -> bool {
        match CacheMeta::find_by_id(MARKETS_META_KEY).one(&self.db).await {
            Ok(meta) => cache_policy::is_fresh(
                meta.map(|m| m.updated_at),
                cache_policy::MARKETS_TTL_SECS,
            ),
            Err(_) => false,
        }
    }

    pub async fn fetch_markets(
        &self,
        page: u32,
        per_page: u32,
        sort: MarketSort,
        category: Option<String>,
    ) -> Result<Vec<CoinMarket>, NetworkError> {
        let key = format!(
            "markets_{page}_{per_page}_{}_{}",
            sort.as_str(),
            category.as_deref().unwrap_or("all")
        );
        retry::run_default(|| {
            self.market_deduper.run(&key, || {
                let service = self.service.clone();
                let db = self.db.clone();
                let category = category.clone();
                async move {
                    let dtos = service
                        .fetch_markets(page, per_page, sort, category.as_deref())
                        .await?;
                    let markets: Vec<CoinMarket> =
                        dtos.into_iter().map(|dto| dto.into_domain()).collect();
                    if category.as_deref().map_or(true, str::is_empty) {
                        store_markets(&db, &markets, page == 1).await;
                    }
                    Ok(Self::sort_markets(markets, sort))
                }
            })
        })
        .await
    }

    pub async fn fetch_trending(&self) -> Result<Vec<TrendingCoin>, NetworkError> {
        if let Some(cached) = self
            .disk_cache
            .load::<Vec<TrendingCoin>>("trending", cache_policy::TRENDING_TTL_SECS)
        {
            if cached.is_fresh {
                return Ok(cached.value);
            }
        }
        let dto = retry::run_default(|| self.service.fetch_trending()).await?;
        let trending = dto.into_domain();
        self.disk_cache.store(&trending, "trending");
        Ok(trending)
    }

    pub async fn fetch_global_market(&self) -> Result<GlobalMarket, NetworkError> {
        let dto = retry::run_default(|| self.service.fetch_global()).await?;
        let global = dto.into_domain();
        self.disk_cache.store(&global, "global_market");
        Ok(global)
    }

    pub async fn fetch_categories(&self) -> Result<Vec<MarketCategory>, NetworkError> {
        let dtos = retry::run_default(|| self.service.fetch_categories()).await?;
        let categories: Vec<MarketCategory> =
            dtos.into_iter().map(|dto| dto.into_domain()).collect();
        self.disk_cache.store(&categories, "categories_list");
        Ok(categories)
    }

    pub async fn fetch_category_stats(&self) -> Result<Vec<MarketCategoryStats>, NetworkError> {
        let dtos = retry::run_default(|| self.service.fetch_category_stats()).await?;
        let stats: Vec<MarketCategoryStats> =
            dtos.into_iter().map(|dto| dto.into_domain()).collect();
        self.disk_cache.store(&stats, "categories_stats");
        Ok(stats)
    }

    pub async fn fetch_exchanges(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Exchange>, NetworkError> {
        let dtos = retry::run_default(|| self.service.fetch_exchanges(page, per_page)).await?;
        let exchanges: Vec<Exchange> = dtos.into_iter().map(|dto| dto.into_domain()).collect();
        self.disk_cache
            .store(&exchanges, &format!("exchanges_{page}_{per_page}"));
        Ok(exchanges)
    }

    pub fn cached_trending(&self) -> Vec<TrendingCoin> {
        self.disk_cache
            .load("trending", cache_policy::TRENDING_TTL_SECS)
            .map(|cached| cached.value)
            .unwrap_or_default()
    }

    pub fn is_trending_cache_valid(&self) -> bool {
        self.disk_cache
            .load::<Vec<TrendingCoin>>("trending", cache_policy::TRENDING_TTL_SECS)
            .map(|cached| cached.is_fresh)
            .unwrap_or(false)
    }

    pub fn cached_global_market(&self) -> Option<GlobalMarket> {
        self.disk_cache
            .load("global_market", cache_policy::GLOBAL_TTL_SECS)
            .map(|cached| cached.value)
    }

    pub fn cached_categories(&self) -> Vec<MarketCategory> {
        self.disk_cache
            .load("categories_list", cache_policy::CATEGORIES_TTL_SECS)
            .map(|cached| cached.value)
            .unwrap_or_default()
    }

    pub fn cached_category_stats(&self) -> Vec<MarketCategoryStats> {
        self.disk_cache
            .load("categories_stats", cache_policy::CATEGORY_STATS_TTL_SECS)
            .map(|cached| cached.value)
            .unwrap_or_default()
    }

    pub fn cached_exchanges(&self, page: u32, per_page: u32) -> Vec<Exchange> {
        self.disk_cache
            .load(
                &format!("exchanges_{page}_{per_page}"),
                cache_policy::EXCHANGES_TTL_SECS,
            )
            .map(|cached| cached.value)
            .unwrap_or_default()
    }

    pub fn is_global_cache_valid(&self) -> bool {
        self.disk_cache
            .load::<GlobalMarket>("global_market", cache_policy::GLOBAL_TTL_SECS)
            .map(|cached| cached.is_fresh)
            .unwrap_or(false)
    }

    pub fn is_categories_cache_valid(&self) -> bool {
        self.disk_cache
            .load::<Vec<MarketCategory>>("categories_list", cache_policy::CATEGORIES_TTL_SECS)
            .map(|cached| cached.is_fresh)
            .unwrap_or(false)
    }

    pub fn is_category_stats_cache_valid(&self) -> bool {
        self.disk_cache
            .load::<Vec<MarketCategoryStats>>(
                "categories_stats",
                cache_policy::CATEGORY_STATS_TTL_SECS,
            )
            .map(|cached| cached.is_fresh)
            .unwrap_or(false)
    }

    pub fn is_exchanges_cache_valid(&self, page: u32, per_page: u32) -> bool {
        self.disk_cache
            .load::<Vec<Exchange>>(
                &format!("exchanges_{page}_{per_page}"),
                cache_policy::EXCHANGES_TTL_SECS,
            )
            .map(|cached| cached.is_fresh)
            .unwrap_or(false)
    }

    /// The client-side sort applied to every returned list; the upstream
    /// API only reliably orders by market cap.
    pub fn sort_markets(mut markets: Vec<CoinMarket>, sort: MarketSort) -> Vec<CoinMarket> {
        match sort {
            MarketSort::MarketCapDesc => markets.sort_by(|a, b| {
                b.market_cap
                    .unwrap_or(0.0)
                    .total_cmp(&a.market_cap.unwrap_or(0.0))
            }),
            MarketSort::PriceDesc => {
                markets.sort_by(|a, b| b.current_price.total_cmp(&a.current_price))
            }
            MarketSort::ChangeDesc => markets.sort_by(|a, b| {
                b.price_change_percentage_24h
                    .total_cmp(&a.price_change_percentage_24h)
            }),
            MarketSort::Alphabetical => markets.sort_by(|a, b| {
                let ordering = a.name.to_lowercase().cmp(&b.name.to_lowercase());
                if ordering == Ordering::Equal {
                    a.name.cmp(&b.name)
                } else {
                    ordering
                }
            }),
        }
        markets
    }

    /// Pagination-accumulation primitive: keyed union by id, entries in
    /// `new` override same-id entries in `existing`. Result order is
    /// unspecified until re-sorted by the caller.
    pub fn merge(existing: Vec<CoinMarket>, new: Vec<CoinMarket>) -> Vec<CoinMarket> {
        let mut by_id: HashMap<String, CoinMarket> = existing
            .into_iter()
            .map(|market| (market.id.clone(), market))
            .collect();
        for market in new {
            by_id.insert(market.id.clone(), market);
        }
        by_id.into_values().collect()
    }
}

fn market_to_domain(model: cached_markets::Model) -> CoinMarket {
    CoinMarket {
        id: model.coin_id,
        name: model.name,
        symbol: model.symbol,
        image_url: model.image_url,
        current_price: model.current_price,
        price_change_percentage_24h: model.price_change_percentage_24h,
        market_cap: model.market_cap,
        total_volume: model.total_volume,
        high_24h: model.high_24h,
        low_24h: model.low_24h,
        last_updated: model.last_updated,
    }
}

/// Page 1 replaces the table wholesale and bumps the dataset timestamp;
/// later pages upsert row by row. One transaction either way, so readers
/// never observe the intermediate empty table. Store failures are logged
/// and swallowed.
async fn store_markets(db: &DatabaseConnection, markets: &[CoinMarket], is_first_page: bool) {
    let result: Result<(), DbErr> = async {
        let txn = db.begin().await?;
        if is_first_page {
            CachedMarkets::delete_many().exec(&txn).await?;
        }
        let now = Utc::now();
        for market in markets {
            let row = cached_markets::ActiveModel {
                coin_id: Set(market.id.clone()),
                name: Set(market.name.clone()),
                symbol: Set(market.symbol.clone()),
                image_url: Set(market.image_url.clone()),
                current_price: Set(market.current_price),
                price_change_percentage_24h: Set(market.price_change_percentage_24h),
                market_cap: Set(market.market_cap),
                total_volume: Set(market.total_volume),
                high_24h: Set(market.high_24h),
                low_24h: Set(market.low_24h),
                last_updated: Set(market.last_updated),
                updated_at: Set(now),
            };
            CachedMarkets::insert(row)
                .on_conflict(
                    OnConflict::column(cached_markets::Column::CoinId)
                        .update_columns([
                            cached_markets::Column::Name,
                            cached_markets::Column::Symbol,
                            cached_markets::Column::ImageUrl,
                            cached_markets::Column::CurrentPrice,
                            cached_markets::Column::PriceChangePercentage24h,
                            cached_markets::Column::MarketCap,
                            cached_markets::Column::TotalVolume,
                            cached_markets::Column::High24h,
                            cached_markets::Column::Low24h,
                            cached_markets::Column::LastUpdated,
                            cached_markets::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }
        if is_first_page {
            let meta = cache_meta::ActiveModel {
                key: Set(MARKETS_META_KEY.to_string()),
                updated_at: Set(now),
            };
            CacheMeta::insert(meta)
                .on_conflict(
                    OnConflict::column(cache_meta::Column::Key)
                        .update_column(cache_meta::Column::UpdatedAt)
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }
    .await;

    if let Err(error) = result {
        tracing::warn!("Failed to store markets: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, name: &str, price: f64, market_cap: Option<f64>, change: f64) -> CoinMarket {
        CoinMarket {
            id: id.to_string(),
            name: name.to_string(),
            symbol: id.to_uppercase(),
            image_url: None,
            current_price: price,
            price_change_percentage_24h: change,
            market_cap,
            total_volume: None,
            high_24h: None,
            low_24h: None,
            last_updated: None,
        }
    }

    #[test]
    fn sort_by_price_desc() {
        let sorted = MarketRepository::sort_markets(
            vec![
                coin("a", "A", 2.0, Some(10.0), 0.0),
                coin("b", "B", 10.0, Some(5.0), 0.0),
                coin("c", "C", 5.0, Some(1.0), 0.0),
            ],
            MarketSort::PriceDesc,
        );
        assert_eq!(sorted[0].id, "b");
        assert_eq!(sorted[2].id, "a");
    }

    #[test]
    fn sort_by_market_cap_treats_missing_as_zero() {
        let sorted = MarketRepository::sort_markets(
            vec![
                coin("a", "A", 1.0, None, 0.0),
                coin("b", "B", 1.0, Some(5.0), 0.0),
            ],
            MarketSort::MarketCapDesc,
        );
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn sort_alphabetical_ignores_case() {
        let sorted = MarketRepository::sort_markets(
            vec![
                coin("b", "beacon", 1.0, None, 0.0),
                coin("a", "Aave", 1.0, None, 0.0),
                coin("z", "ZCash", 1.0, None, 0.0),
            ],
            MarketSort::Alphabetical,
        );
        let names: Vec<&str> = sorted.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Aave", "beacon", "ZCash"]);
    }

    #[test]
    fn merge_overrides_by_id() {
        let merged = MarketRepository::merge(
            vec![coin("a", "A", 1.0, None, 0.0)],
            vec![coin("a", "A2", 2.0, None, 0.0)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].current_price, 2.0);
        assert_eq!(merged[0].name, "A2");
    }

    #[test]
    fn merge_unions_distinct_ids() {
        let merged = MarketRepository::merge(
            vec![coin("a", "A", 1.0, None, 0.0)],
            vec![coin("b", "B", 2.0, None, 0.0)],
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let a = vec![coin("a", "A", 1.0, None, 0.0)];
        let b = vec![coin("b", "B", 2.0, None, 0.0)];
        let once = MarketRepository::merge(a.clone(), b.clone());
        let twice = MarketRepository::merge(a, MarketRepository::merge(once.clone(), b));
        let mut once_ids: Vec<String> = once.iter().map(|m| m.id.clone()).collect();
        let mut twice_ids: Vec<String> = twice.iter().map(|m| m.id.clone()).collect();
        once_ids.sort();
        twice_ids.sort();
        assert_eq!(once_ids, twice_ids);
    }
}
