use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::market::{
    CoinMarket, CoinNote, ConversionRecord, Favorite, Holding, RecentSearch,
};
use crate::models::ErrorResponse;
use crate::AppState;

// Favorites

pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<Favorite>> {
    Json(state.favorites_repository.favorites().await)
}

/// POST /api/favorites with the market row being favorited.
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(coin): Json<CoinMarket>,
) -> StatusCode {
    state.favorites_repository.add_favorite(&coin).await;
    StatusCode::CREATED
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> StatusCode {
    state.favorites_repository.remove_favorite(&coin_id).await;
    StatusCode::NO_CONTENT
}

// Portfolio holdings

#[derive(Debug, Deserialize)]
pub struct HoldingRequest {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub avg_buy_price: Option<f64>,
}

pub async fn list_holdings(State(state): State<AppState>) -> Json<Vec<Holding>> {
    Json(state.portfolio_repository.holdings().await)
}

pub async fn create_holding(
    State(state): State<AppState>,
    Json(request): Json<HoldingRequest>,
) -> (StatusCode, Json<Holding>) {
    let now = Utc::now();
    let holding = Holding {
        id: Uuid::new_v4().to_string(),
        coin_id: request.coin_id,
        symbol: request.symbol.to_uppercase(),
        name: request.name,
        amount: request.amount,
        avg_buy_price: request.avg_buy_price,
        created_at: now,
        updated_at: now,
    };
    state.portfolio_repository.upsert_holding(&holding).await;
    (StatusCode::CREATED, Json(holding))
}

pub async fn update_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<HoldingRequest>,
) -> Result<Json<Holding>, (StatusCode, Json<ErrorResponse>)> {
    let Some(existing) = state.portfolio_repository.holding(&id).await else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Holding '{id}' not found"),
            }),
        ));
    };

    let holding = Holding {
        id: existing.id,
        coin_id: request.coin_id,
        symbol: request.symbol.to_uppercase(),
        name: request.name,
        amount: request.amount,
        avg_buy_price: request.avg_buy_price,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    state.portfolio_repository.upsert_holding(&holding).await;
    Ok(Json(holding))
}

pub async fn delete_holding(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.portfolio_repository.delete_holding(&id).await;
    StatusCode::NO_CONTENT
}

// Notes

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    pub coin_id: Option<String>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<NotesQuery>,
) -> Json<Vec<CoinNote>> {
    let notes = match query.coin_id.as_deref() {
        Some(coin_id) => state.notes_repository.notes_for(coin_id).await,
        None => state.notes_repository.all_notes().await,
    };
    Json(notes)
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub coin_id: String,
    pub coin_name: String,
    pub coin_symbol: String,
    pub text: String,
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(request): Json<NoteRequest>,
) -> (StatusCode, Json<CoinNote>) {
    let note = state
        .notes_repository
        .add_note(
            &request.coin_id,
            &request.coin_name,
            &request.coin_symbol,
            &request.text,
        )
        .await;
    (StatusCode::CREATED, Json(note))
}

pub async fn delete_note(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.notes_repository.delete_note(&id).await;
    StatusCode::NO_CONTENT
}

// Recent searches

pub async fn list_searches(State(state): State<AppState>) -> Json<Vec<RecentSearch>> {
    Json(state.search_repository.recent_searches().await)
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

pub async fn add_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> StatusCode {
    state.search_repository.add_search(&request.query).await;
    StatusCode::CREATED
}

pub async fn clear_searches(State(state): State<AppState>) -> StatusCode {
    state.search_repository.clear_searches().await;
    StatusCode::NO_CONTENT
}

// Conversion history

#[derive(Debug, Deserialize)]
pub struct ConversionsQuery {
    pub limit: Option<u64>,
}

pub async fn list_conversions(
    State(state): State<AppState>,
    Query(query): Query<ConversionsQuery>,
) -> Json<Vec<ConversionRecord>> {
    Json(
        state
            .conversion_repository
            .recent(query.limit.unwrap_or(20))
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct ConversionRequest {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub usd_amount: f64,
    pub coin_amount: f64,
}

pub async fn add_conversion(
    State(state): State<AppState>,
    Json(request): Json<ConversionRequest>,
) -> (StatusCode, Json<ConversionRecord>) {
    let record = ConversionRecord {
        id: Uuid::new_v4().to_string(),
        coin_id: request.coin_id,
        symbol: request.symbol.to_uppercase(),
        name: request.name,
        usd_amount: request.usd_amount,
        coin_amount: request.coin_amount,
        created_at: Utc::now(),
    };
    state.conversion_repository.add_record(&record).await;
    (StatusCode::CREATED, Json(record))
}

pub async fn clear_conversions(State(state): State<AppState>) -> StatusCode {
    state.conversion_repository.clear().await;
    StatusCode::NO_CONTENT
}
