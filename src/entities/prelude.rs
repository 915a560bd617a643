pub use super::cache_meta::Entity as CacheMeta;
pub use super::cached_charts::Entity as CachedCharts;
pub use super::cached_coin_details::Entity as CachedCoinDetails;
pub use super::cached_markets::Entity as CachedMarkets;
pub use super::coin_notes::Entity as CoinNotes;
pub use super::conversion_records::Entity as ConversionRecords;
pub use super::favorites::Entity as Favorites;
pub use super::holdings::Entity as Holdings;
pub use super::price_alerts::Entity as PriceAlerts;
pub use super::recent_searches::Entity as RecentSearches;
