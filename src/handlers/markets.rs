use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::handlers::{can_serve_stale, error_response};
use crate::models::market::{
    CoinMarket, Exchange, GlobalMarket, MarketCategory, MarketCategoryStats, MarketSort,
    TrendingCoin,
};
use crate::models::ErrorResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MarketsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketsResponse {
    pub markets: Vec<CoinMarket>,
    /// True when a refresh failed and the payload is cached data.
    pub stale: bool,
}

/// GET /api/markets
///
/// Cache-first on an uncategorized page 1; otherwise refreshes through the
/// deduplicated, retried provider chain. A failed refresh with a warm
/// cache degrades to stale data for the qualifying error classes.
pub async fn get_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> Result<Json<MarketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(100);
    let sort = match query.sort.as_deref() {
        None => MarketSort::MarketCapDesc,
        Some(raw) => MarketSort::from_str(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unknown sort '{raw}'"),
                }),
            )
        })?,
    };
    let category = query.category.filter(|value| !value.is_empty());
    let is_primary_page = page == 1 && category.is_none();

    if is_primary_page && state.market_repository.is_markets_cache_valid().await {
        let markets = state.market_repository.cached_markets(sort).await;
        if !markets.is_empty() {
            return Ok(Json(MarketsResponse {
                markets,
                stale: false,
            }));
        }
    }

    match state
        .market_repository
        .fetch_markets(page, per_page, sort, category)
        .await
    {
        Ok(markets) => Ok(Json(MarketsResponse {
            markets,
            stale: false,
        })),
        Err(error) => {
            if is_primary_page && can_serve_stale(&error) {
                let markets = state.market_repository.cached_markets(sort).await;
                if !markets.is_empty() {
                    return Ok(Json(MarketsResponse {
                        markets,
                        stale: true,
                    }));
                }
            }
            Err(error_response(&error))
        }
    }
}

pub async fn get_trending(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingCoin>>, (StatusCode, Json<ErrorResponse>)> {
    match state.market_repository.fetch_trending().await {
        Ok(trending) => Ok(Json(trending)),
        Err(error) => {
            let cached = state.market_repository.cached_trending();
            if can_serve_stale(&error) && !cached.is_empty() {
                return Ok(Json(cached));
            }
            Err(error_response(&error))
        }
    }
}

pub async fn get_global(
    State(state): State<AppState>,
) -> Result<Json<GlobalMarket>, (StatusCode, Json<ErrorResponse>)> {
    if state.market_repository.is_global_cache_valid() {
        if let Some(global) = state.market_repository.cached_global_market() {
            return Ok(Json(global));
        }
    }
    match state.market_repository.fetch_global_market().await {
        Ok(global) => Ok(Json(global)),
        Err(error) => {
            if can_serve_stale(&error) {
                if let Some(global) = state.market_repository.cached_global_market() {
                    return Ok(Json(global));
                }
            }
            Err(error_response(&error))
        }
    }
}

pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketCategory>>, (StatusCode, Json<ErrorResponse>)> {
    if state.market_repository.is_categories_cache_valid() {
        let categories = state.market_repository.cached_categories();
        if !categories.is_empty() {
            return Ok(Json(categories));
        }
    }
    match state.market_repository.fetch_categories().await {
        Ok(categories) => Ok(Json(categories)),
        Err(error) => {
            let cached = state.market_repository.cached_categories();
            if can_serve_stale(&error) && !cached.is_empty() {
                return Ok(Json(cached));
            }
            Err(error_response(&error))
        }
    }
}

pub async fn get_category_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketCategoryStats>>, (StatusCode, Json<ErrorResponse>)> {
    if state.market_repository.is_category_stats_cache_valid() {
        let stats = state.market_repository.cached_category_stats();
        if !stats.is_empty() {
            return Ok(Json(stats));
        }
    }
    match state.market_repository.fetch_category_stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(error) => {
            let cached = state.market_repository.cached_category_stats();
            if can_serve_stale(&error) && !cached.is_empty() {
                return Ok(Json(cached));
            }
            Err(error_response(&error))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExchangesQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn get_exchanges(
    State(state): State<AppState>,
    Query(query): Query<ExchangesQuery>,
) -> Result<Json<Vec<Exchange>>, (StatusCode, Json<ErrorResponse>)> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(50);

    if state
        .market_repository
        .is_exchanges_cache_valid(page, per_page)
    {
        let exchanges = state.market_repository.cached_exchanges(page, per_page);
        if !exchanges.is_empty() {
            return Ok(Json(exchanges));
        }
    }
    match state.market_repository.fetch_exchanges(page, per_page).await {
        Ok(exchanges) => Ok(Json(exchanges)),
        Err(error) => {
            let cached = state.market_repository.cached_exchanges(page, per_page);
            if can_serve_stale(&error) && !cached.is_empty() {
                return Ok(Json(cached));
            }
            Err(error_response(&error))
        }
    }
}
