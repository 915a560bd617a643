use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::handlers::{can_serve_stale, error_response};
use crate::models::market::{ChartRange, CoinDetails, PricePoint};
use crate::models::ErrorResponse;
use crate::AppState;

/// GET /api/coins/{id}
pub async fn get_details(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<CoinDetails>, (StatusCode, Json<ErrorResponse>)> {
    if state.coin_repository.is_details_cache_valid(&coin_id).await {
        if let Some(details) = state.coin_repository.cached_details(&coin_id).await {
            return Ok(Json(details));
        }
    }
    match state.coin_repository.fetch_details(&coin_id).await {
        Ok(details) => Ok(Json(details)),
        Err(error) => {
            if can_serve_stale(&error) {
                if let Some(details) = state.coin_repository.cached_details(&coin_id).await {
                    return Ok(Json(details));
                }
            }
            Err(error_response(&error))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub range: Option<String>,
}

/// GET /api/coins/{id}/chart
pub async fn get_chart(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Vec<PricePoint>>, (StatusCode, Json<ErrorResponse>)> {
    let range = match query.range.as_deref() {
        None => ChartRange::SevenDays,
        Some(raw) => ChartRange::from_str(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unknown chart range '{raw}'"),
                }),
            )
        })?,
    };

    if state
        .coin_repository
        .is_chart_cache_valid(&coin_id, range)
        .await
    {
        let points = state.coin_repository.cached_chart(&coin_id, range).await;
        if !points.is_empty() {
            return Ok(Json(points));
        }
    }
    match state.coin_repository.fetch_chart(&coin_id, range).await {
        Ok(points) => Ok(Json(points)),
        Err(error) => {
            if can_serve_stale(&error) {
                let points = state.coin_repository.cached_chart(&coin_id, range).await;
                if !points.is_empty() {
                    return Ok(Json(points));
                }
            }
            Err(error_response(&error))
        }
    }
}
