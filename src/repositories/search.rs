use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{prelude::*, recent_searches};
use crate::models::market::RecentSearch;

const MAX_ITEMS: usize = 10;

/// Recent search history, deduplicated by query and capped.
#[derive(Clone)]
pub struct SearchRepository {
    db: DatabaseConnection,
}

impl SearchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn recent_searches(&self) -> Vec<RecentSearch> {
        match RecentSearches::find()
            .order_by(recent_searches::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|row| RecentSearch {
                    id: row.id,
                    query: row.query,
                    created_at: row.created_at,
                })
                .collect(),
            Err(error) => {
                tracing::warn!("Failed to read recent searches: {error}");
                Vec::new()
            }
        }
    }

    pub async fn add_search(&self, query: &str) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return;
        }

        let result: Result<(), DbErr> = async {
            let txn = self.db.begin().await?;
            RecentSearches::delete_many()
                .filter(recent_searches::Column::Query.eq(trimmed))
                .exec(&txn)
                .await?;
            let row = recent_searches::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                query: Set(trimmed.to_string()),
                created_at: Set(Utc::now()),
            };
            RecentSearches::insert(row).exec(&txn).await?;

            let all = RecentSearches::find()
                .order_by(recent_searches::Column::CreatedAt, Order::Desc)
                .all(&txn)
                .await?;
            for stale in all.iter().skip(MAX_ITEMS) {
                RecentSearches::delete_by_id(stale.id.clone()).exec(&txn).await?;
            }
            txn.commit().await?;
            Ok(())
        }
        .await;

        if let Err(error) = result {
            tracing::warn!("Failed to add search: {error}");
        }
    }

    pub async fn clear_searches(&self) {
        if let Err(error) = RecentSearches::delete_many().exec(&self.db).await {
            tracing::warn!("Failed to clear searches: {error}");
        }
    }
}
