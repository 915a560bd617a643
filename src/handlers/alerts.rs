use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::alert::{AlertDirection, AlertMetric, AlertRepeatMode, PriceAlert};
use crate::models::ErrorResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertRequest {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub target_value: f64,
    pub metric: AlertMetric,
    pub direction: AlertDirection,
    pub repeat_mode: AlertRepeatMode,
    #[serde(default)]
    pub cooldown_minutes: i32,
    pub is_enabled: Option<bool>,
}

/// GET /api/alerts
pub async fn list_alerts(State(state): State<AppState>) -> Json<Vec<PriceAlert>> {
    Json(state.alerts_repository.alerts().await)
}

/// POST /api/alerts
///
/// New alerts start armed with no trigger history.
pub async fn create_alert(
    State(state): State<AppState>,
    Json(request): Json<AlertRequest>,
) -> (StatusCode, Json<PriceAlert>) {
    let alert = PriceAlert {
        id: Uuid::new_v4().to_string(),
        coin_id: request.coin_id,
        symbol: request.symbol.to_uppercase(),
        name: request.name,
        target_value: request.target_value,
        metric: request.metric,
        direction: request.direction,
        repeat_mode: request.repeat_mode,
        cooldown_minutes: request.cooldown_minutes.max(0),
        is_enabled: request.is_enabled.unwrap_or(true),
        is_armed: true,
        created_at: Utc::now(),
        last_triggered_at: None,
    };
    state.alerts_repository.upsert_alert(&alert).await;
    (StatusCode::CREATED, Json(alert))
}

/// PUT /api/alerts/{id}
///
/// Edits replace the alert's definition but keep its trigger history and
/// armed state.
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AlertRequest>,
) -> Result<Json<PriceAlert>, (StatusCode, Json<ErrorResponse>)> {
    let Some(existing) = state.alerts_repository.alert(&id).await else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Alert '{id}' not found"),
            }),
        ));
    };

    let alert = PriceAlert {
        id: existing.id,
        coin_id: request.coin_id,
        symbol: request.symbol.to_uppercase(),
        name: request.name,
        target_value: request.target_value,
        metric: request.metric,
        direction: request.direction,
        repeat_mode: request.repeat_mode,
        cooldown_minutes: request.cooldown_minutes.max(0),
        is_enabled: request.is_enabled.unwrap_or(existing.is_enabled),
        is_armed: existing.is_armed,
        created_at: existing.created_at,
        last_triggered_at: existing.last_triggered_at,
    };
    state.alerts_repository.upsert_alert(&alert).await;
    Ok(Json(alert))
}

/// DELETE /api/alerts/{id}
pub async fn delete_alert(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.alerts_repository.delete_alert(&id).await;
    StatusCode::NO_CONTENT
}
