mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::EntityTrait;

use marketpulse_backend::entities::prelude::{CacheMeta, CachedMarkets};
use marketpulse_backend::error::NetworkError;
use marketpulse_backend::models::market::{MarketSort, TrendingCoin};
use marketpulse_backend::repositories::market::MarketRepository;
use marketpulse_backend::services::disk_cache::DiskCache;

use crate::common::{market_dto, setup_test_db, MockProvider};

async fn build_repository() -> (MarketRepository, Arc<MockProvider>, tempfile::TempDir) {
    let db = setup_test_db().await;
    let provider = Arc::new(MockProvider::new());
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let disk_cache = Arc::new(DiskCache::new(cache_dir.path()));
    let repository = MarketRepository::new(db, provider.clone(), disk_cache);
    (repository, provider, cache_dir)
}

#[tokio::test]
async fn first_page_replaces_the_whole_table() {
    let (repository, provider, _guard) = build_repository().await;

    provider.set_page(
        1,
        vec![
            market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0),
            market_dto("ethereum", "Ethereum", 3_000.0, 4e11, 2.0),
        ],
    );
    repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
        .await
        .expect("first fetch");
    assert_eq!(
        repository
            .cached_markets(MarketSort::MarketCapDesc)
            .await
            .len(),
        2
    );

    // A later authoritative snapshot drops rows that disappeared upstream.
    provider.set_page(1, vec![market_dto("solana", "Solana", 150.0, 7e10, 3.0)]);
    repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
        .await
        .expect("second fetch");

    let cached = repository.cached_markets(MarketSort::MarketCapDesc).await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, "solana");
}

#[tokio::test]
async fn later_pages_merge_without_touching_the_snapshot_timestamp() {
    let (repository, provider, _guard) = build_repository().await;

    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);
    provider.set_page(2, vec![market_dto("ethereum", "Ethereum", 3_000.0, 4e11, 2.0)]);

    repository
        .fetch_markets(1, 1, MarketSort::MarketCapDesc, None)
        .await
        .expect("page 1");
    assert_eq!(
        repository
            .cached_markets(MarketSort::MarketCapDesc)
            .await
            .len(),
        1
    );

    repository
        .fetch_markets(2, 1, MarketSort::MarketCapDesc, None)
        .await
        .expect("page 2");

    let cached = repository.cached_markets(MarketSort::MarketCapDesc).await;
    assert_eq!(cached.len(), 2, "page 2 merges instead of replacing");
    assert!(repository.is_markets_cache_valid().await);
}

#[tokio::test]
async fn category_fetches_are_never_persisted() {
    let (repository, provider, _guard) = build_repository().await;

    *provider.category_markets.lock() =
        vec![market_dto("uniswap", "Uniswap", 10.0, 5e9, -1.0)];

    let fetched = repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, Some("defi".to_string()))
        .await
        .expect("category fetch");
    assert_eq!(fetched.len(), 1);

    assert!(repository
        .cached_markets(MarketSort::MarketCapDesc)
        .await
        .is_empty());
    assert!(!repository.is_markets_cache_valid().await);
}

#[tokio::test]
async fn results_are_resorted_by_the_requested_order() {
    let (repository, provider, _guard) = build_repository().await;

    // Upstream order is market-cap; the caller asked for price.
    provider.set_page(
        1,
        vec![
            market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0),
            market_dto("ethereum", "Ethereum", 3_000.0, 4e11, 2.0),
            market_dto("tether", "Tether", 1.0, 1e11, 0.0),
            market_dto("binancecoin", "BNB", 600.0, 9e10, -0.5),
        ],
    );

    let fetched = repository
        .fetch_markets(1, 100, MarketSort::PriceDesc, None)
        .await
        .expect("fetch");
    let prices: Vec<f64> = fetched.iter().map(|m| m.current_price).collect();
    let mut expected = prices.clone();
    expected.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(prices, expected);

    let fetched = repository
        .fetch_markets(1, 100, MarketSort::Alphabetical, None)
        .await
        .expect("fetch");
    let names: Vec<String> = fetched.iter().map(|m| m.name.clone()).collect();
    assert_eq!(names, ["Bitcoin", "BNB", "Ethereum", "Tether"]);
}

#[tokio::test]
async fn concurrent_identical_fetches_hit_the_provider_once() {
    let (repository, provider, _guard) = build_repository().await;

    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);
    *provider.markets_delay.lock() = Duration::from_millis(50);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let repository = repository.clone();
        handles.push(tokio::spawn(async move {
            repository
                .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
                .await
        }));
    }
    for handle in handles {
        let markets = handle.await.expect("join").expect("fetch");
        assert_eq!(markets.len(), 1);
    }

    assert_eq!(provider.markets_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let (repository, provider, _guard) = build_repository().await;

    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);
    provider.queue_markets_error(NetworkError::Server { status: 503 });

    let fetched = repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
        .await
        .expect("retried fetch");
    assert_eq!(fetched.len(), 1);
    assert_eq!(provider.markets_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let (repository, provider, _guard) = build_repository().await;

    provider.queue_markets_error(NetworkError::Server { status: 404 });

    let result = repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
        .await;
    assert_eq!(result, Err(NetworkError::Server { status: 404 }));
    assert_eq!(provider.markets_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_database_reads_as_an_empty_list() {
    let (repository, _provider, _guard) = build_repository().await;
    assert!(repository
        .cached_markets(MarketSort::MarketCapDesc)
        .await
        .is_empty());
    assert!(!repository.is_markets_cache_valid().await);
}

#[tokio::test]
async fn trending_serves_a_fresh_blob_without_the_provider() {
    let db = setup_test_db().await;
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let disk_cache = Arc::new(DiskCache::new(cache_dir.path()));
    // The mock answers trending with a failure, so any success below came
    // from the blob cache.
    let repository =
        MarketRepository::new(db, Arc::new(MockProvider::new()), disk_cache.clone());

    assert!(!repository.is_trending_cache_valid());
    assert!(repository.cached_trending().is_empty());

    let trending = vec![TrendingCoin {
        id: "bitcoin".to_string(),
        name: "Bitcoin".to_string(),
        symbol: "BTC".to_string(),
        image_url: None,
        market_cap_rank: Some(1),
        price_btc: None,
    }];
    disk_cache.store(&trending, "trending");

    assert!(repository.is_trending_cache_valid());
    let fetched = repository.fetch_trending().await.expect("cache hit");
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, "bitcoin");
}

#[tokio::test]
async fn meta_and_market_tables_match_after_page_one() {
    let db = setup_test_db().await;
    let provider = Arc::new(MockProvider::new());
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let repository = MarketRepository::new(
        db.clone(),
        provider.clone(),
        Arc::new(DiskCache::new(cache_dir.path())),
    );

    provider.set_page(1, vec![market_dto("bitcoin", "Bitcoin", 50_000.0, 1e12, 1.0)]);
    repository
        .fetch_markets(1, 100, MarketSort::MarketCapDesc, None)
        .await
        .expect("fetch");

    let rows = CachedMarkets::find().all(&db).await.expect("rows");
    assert_eq!(rows.len(), 1);
    let meta = CacheMeta::find_by_id("markets")
        .one(&db)
        .await
        .expect("meta query")
        .expect("meta row");
    assert_eq!(meta.key, "markets");
}
