use chrono::{DateTime, Duration, Utc};

/// TTL table for every cached dataset, in seconds.
///
/// Freshness is a pure function of `(now, updated_at, ttl)`; a missing
/// timestamp is always stale.
pub const MARKETS_TTL_SECS: i64 = 2 * 60;
pub const DETAILS_TTL_SECS: i64 = 5 * 60;
pub const CHART_TTL_SECS: i64 = 10 * 60;
pub const CATEGORIES_TTL_SECS: i64 = 30 * 60;
pub const CATEGORY_STATS_TTL_SECS: i64 = 15 * 60;
pub const EXCHANGES_TTL_SECS: i64 = 15 * 60;
pub const GLOBAL_TTL_SECS: i64 = 5 * 60;
pub const TRENDING_TTL_SECS: i64 = 10 * 60;

pub fn is_fresh_at(now: DateTime<Utc>, updated_at: Option<DateTime<Utc>>, ttl_secs: i64) -> bool {
    match updated_at {
        Some(updated_at) => now.signed_duration_since(updated_at) < Duration::seconds(ttl_secs),
        None => false,
    }
}

pub fn is_fresh(updated_at: Option<DateTime<Utc>>, ttl_secs: i64) -> bool {
    is_fresh_at(Utc::now(), updated_at, ttl_secs)
}
