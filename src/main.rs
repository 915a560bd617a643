use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, put};
use axum::Router;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketpulse_backend::config::AppConfig;
use marketpulse_backend::handlers;
use marketpulse_backend::jobs::alerts_check::start_alerts_check_job;
use marketpulse_backend::network::backoff::{NetworkBackoff, NetworkThrottle};
use marketpulse_backend::network::client::NetworkClient;
use marketpulse_backend::repositories::{
    alerts::AlertsRepository, coin::CoinRepository, conversion::ConversionHistoryRepository,
    favorites::FavoritesRepository, market::MarketRepository, notes::NotesRepository,
    portfolio::PortfolioRepository, search::SearchRepository,
};
use marketpulse_backend::services::alerts_checker::AlertsChecker;
use marketpulse_backend::services::coingecko::CoinGeckoService;
use marketpulse_backend::services::coinpaprika::CoinPaprikaService;
use marketpulse_backend::services::disk_cache::DiskCache;
use marketpulse_backend::services::fallback::FallbackMarketService;
use marketpulse_backend::services::notifier::LogNotifier;
use marketpulse_backend::services::provider::MarketDataProvider;
use marketpulse_backend::AppState;

const THROTTLE_MIN_INTERVAL: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketpulse_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // One rate-limit gate and one spacing throttle shared by every
    // outgoing call, regardless of provider.
    let backoff = Arc::new(NetworkBackoff::new());
    let throttle = Arc::new(NetworkThrottle::new(THROTTLE_MIN_INTERVAL));

    let coingecko_client = NetworkClient::new(
        config.coingecko_base_url.clone(),
        config.coingecko_fallback_base_url.clone(),
        Some(("x-cg-demo-api-key", config.coingecko_api_key.clone())),
        backoff.clone(),
        throttle.clone(),
    );
    let coinpaprika_client = NetworkClient::new(
        config.coinpaprika_base_url.clone(),
        None,
        None,
        backoff.clone(),
        throttle.clone(),
    );

    let primary: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoService::new(coingecko_client));
    let secondary: Arc<dyn MarketDataProvider> =
        Arc::new(CoinPaprikaService::new(coinpaprika_client));
    let service: Arc<dyn MarketDataProvider> =
        Arc::new(FallbackMarketService::new(primary, Some(secondary)));

    let disk_cache = Arc::new(DiskCache::new(&config.disk_cache_dir));

    let market_repository = MarketRepository::new(db.clone(), service.clone(), disk_cache.clone());
    let coin_repository = CoinRepository::new(db.clone(), service.clone());
    let alerts_repository = AlertsRepository::new(db.clone());

    let checker = Arc::new(AlertsChecker::new(
        alerts_repository.clone(),
        market_repository.clone(),
        Arc::new(LogNotifier),
        config.alerts_default_cooldown_minutes,
    ));
    start_alerts_check_job(
        market_repository.clone(),
        checker,
        config.alerts_check_interval_secs,
    );

    let state = AppState {
        db: db.clone(),
        market_repository,
        coin_repository,
        alerts_repository,
        favorites_repository: FavoritesRepository::new(db.clone()),
        portfolio_repository: PortfolioRepository::new(db.clone()),
        notes_repository: NotesRepository::new(db.clone()),
        search_repository: SearchRepository::new(db.clone()),
        conversion_repository: ConversionHistoryRepository::new(db),
    };

    // Build router
    let app = Router::new()
        .route("/api/markets", get(handlers::markets::get_markets))
        .route(
            "/api/markets/trending",
            get(handlers::markets::get_trending),
        )
        .route("/api/markets/global", get(handlers::markets::get_global))
        .route(
            "/api/markets/categories",
            get(handlers::markets::get_categories),
        )
        .route(
            "/api/markets/category-stats",
            get(handlers::markets::get_category_stats),
        )
        .route(
            "/api/markets/exchanges",
            get(handlers::markets::get_exchanges),
        )
        .route("/api/coins/{coin_id}", get(handlers::coins::get_details))
        .route(
            "/api/coins/{coin_id}/chart",
            get(handlers::coins::get_chart),
        )
        .route(
            "/api/alerts",
            get(handlers::alerts::list_alerts).post(handlers::alerts::create_alert),
        )
        .route(
            "/api/alerts/{id}",
            put(handlers::alerts::update_alert).delete(handlers::alerts::delete_alert),
        )
        .route(
            "/api/favorites",
            get(handlers::user_data::list_favorites).post(handlers::user_data::add_favorite),
        )
        .route(
            "/api/favorites/{coin_id}",
            delete(handlers::user_data::remove_favorite),
        )
        .route(
            "/api/portfolio",
            get(handlers::user_data::list_holdings).post(handlers::user_data::create_holding),
        )
        .route(
            "/api/portfolio/{id}",
            put(handlers::user_data::update_holding).delete(handlers::user_data::delete_holding),
        )
        .route(
            "/api/notes",
            get(handlers::user_data::list_notes).post(handlers::user_data::create_note),
        )
        .route("/api/notes/{id}", delete(handlers::user_data::delete_note))
        .route(
            "/api/searches",
            get(handlers::user_data::list_searches)
                .post(handlers::user_data::add_search)
                .delete(handlers::user_data::clear_searches),
        )
        .route(
            "/api/conversions",
            get(handlers::user_data::list_conversions)
                .post(handlers::user_data::add_conversion)
                .delete(handlers::user_data::clear_conversions),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(
        "Server listening on {}",
        listener.local_addr().expect("listener has no local addr")
    );

    axum::serve(listener, app).await.expect("Server error");
}
