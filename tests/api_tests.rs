mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, put};
use axum::Router;
use chrono::Utc;
use sea_orm::{EntityTrait, Set};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use marketpulse_backend::entities::{cache_meta, prelude::CacheMeta};
use marketpulse_backend::error::NetworkError;
use marketpulse_backend::handlers;
use marketpulse_backend::repositories::{
    alerts::AlertsRepository, coin::CoinRepository, conversion::ConversionHistoryRepository,
    favorites::FavoritesRepository, market::MarketRepository, notes::NotesRepository,
    portfolio::PortfolioRepository, search::SearchRepository,
};
use marketpulse_backend::services::disk_cache::DiskCache;
use marketpulse_backend::AppState;

use crate::common::{market_dto, setup_test_db, MockProvider};

async fn build_test_app() -> (Router, Arc<MockProvider>, TempDir) {
    let db = setup_test_db().await;
    let provider = Arc::new(MockProvider::new());
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let disk_cache = Arc::new(DiskCache::new(cache_dir.path()));

    let state = AppState {
        db: db.clone(),
        market_repository: MarketRepository::new(db.clone(), provider.clone(), disk_cache),
        coin_repository: CoinRepository::new(db.clone(), provider.clone()),
        alerts_repository: AlertsRepository::new(db.clone()),
        favorites_repository: FavoritesRepository::new(db.clone()),
        portfolio_repository: PortfolioRepository::new(db.clone()),
        notes_repository: NotesRepository::new(db.clone()),
        search_repository: SearchRepository::new(db.clone()),
        conversion_repository: ConversionHistoryRepository::new(db),
    };

    let app = Router::new()
        .route("/api/markets", get(handlers::markets::get_markets))
        .route(
            "/api/alerts",
            get(handlers::alerts::list_alerts).post(handlers::alerts::create_alert),
        )
        .route(
            "/api/alerts/{id}",
            put(handlers::alerts::update_alert).delete(handlers::alerts::delete_alert),
        )
        .with_state(state);

    (app, provider, cache_dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn markets_endpoint_returns_fetched_rows() {
    let (app, provider, _guard) = build_test_app().await;
    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/markets?page=1&per_page=100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stale"], json!(false));
    assert_eq!(json["markets"][0]["id"], json!("bitcoin"));
}

#[tokio::test]
async fn markets_endpoint_degrades_to_stale_cache_when_offline() {
    let db = setup_test_db().await;
    let provider = Arc::new(MockProvider::new());
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let market_repository = MarketRepository::new(
        db.clone(),
        provider.clone(),
        Arc::new(DiskCache::new(cache_dir.path())),
    );

    let state = AppState {
        db: db.clone(),
        market_repository,
        coin_repository: CoinRepository::new(db.clone(), provider.clone()),
        alerts_repository: AlertsRepository::new(db.clone()),
        favorites_repository: FavoritesRepository::new(db.clone()),
        portfolio_repository: PortfolioRepository::new(db.clone()),
        notes_repository: NotesRepository::new(db.clone()),
        search_repository: SearchRepository::new(db.clone()),
        conversion_repository: ConversionHistoryRepository::new(db.clone()),
    };
    let app = Router::new()
        .route("/api/markets", get(handlers::markets::get_markets))
        .with_state(state);

    // Warm the cache, then expire the snapshot timestamp and fail the
    // next refresh.
    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/markets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let meta = CacheMeta::find_by_id("markets")
        .one(&db)
        .await
        .expect("meta query")
        .expect("meta row");
    let mut expired: cache_meta::ActiveModel = meta.into();
    expired.updated_at = Set(Utc::now() - chrono::Duration::minutes(10));
    CacheMeta::update(expired).exec(&db).await.expect("expire");

    provider.queue_markets_error(NetworkError::Offline);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/markets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stale"], json!(true));
    assert_eq!(json["markets"][0]["id"], json!("bitcoin"));
}

#[tokio::test]
async fn invalid_sort_is_rejected() {
    let (app, _provider, _guard) = build_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/markets?sort=volume")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn alerts_crud_round_trip() {
    let (app, _provider, _guard) = build_test_app().await;

    let create = Request::builder()
        .method("POST")
        .uri("/api/alerts")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "coin_id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "target_value": 100000.0,
                "metric": "price",
                "direction": "above",
                "repeat_mode": "once_until_reset",
                "cooldown_minutes": 15
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["symbol"], json!("BTC"));
    assert_eq!(created["is_armed"], json!(true));
    let id = created["id"].as_str().expect("id").to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/alerts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/alerts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/alerts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn updating_a_missing_alert_is_not_found() {
    let (app, _provider, _guard) = build_test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/alerts/nope")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "coin_id": "bitcoin",
                        "symbol": "btc",
                        "name": "Bitcoin",
                        "target_value": 1.0,
                        "metric": "price",
                        "direction": "below",
                        "repeat_mode": "repeat_with_cooldown"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
