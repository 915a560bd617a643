use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, Order, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{conversion_records, prelude::*};
use crate::models::market::ConversionRecord;

const MAX_ITEMS: usize = 20;

/// History of coin/USD conversions, newest first and capped.
#[derive(Clone)]
pub struct ConversionHistoryRepository {
    db: DatabaseConnection,
}

impl ConversionHistoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn recent(&self, limit: u64) -> Vec<ConversionRecord> {
        match ConversionRecords::find()
            .order_by(conversion_records::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|row| ConversionRecord {
                    id: row.id,
                    coin_id: row.coin_id,
                    symbol: row.symbol,
                    name: row.name,
                    usd_amount: row.usd_amount,
                    coin_amount: row.coin_amount,
                    created_at: row.created_at,
                })
                .collect(),
            Err(error) => {
                tracing::warn!("Failed to read conversion history: {error}");
                Vec::new()
            }
        }
    }

    pub async fn add_record(&self, record: &ConversionRecord) {
        let result: Result<(), DbErr> = async {
            let txn = self.db.begin().await?;
            let row = conversion_records::ActiveModel {
                id: Set(record.id.clone()),
                coin_id: Set(record.coin_id.clone()),
                symbol: Set(record.symbol.clone()),
                name: Set(record.name.clone()),
                usd_amount: Set(record.usd_amount),
                coin_amount: Set(record.coin_amount),
                created_at: Set(record.created_at),
            };
            ConversionRecords::insert(row).exec(&txn).await?;

            let all = ConversionRecords::find()
                .order_by(conversion_records::Column::CreatedAt, Order::Desc)
                .all(&txn)
                .await?;
            for stale in all.iter().skip(MAX_ITEMS) {
                ConversionRecords::delete_by_id(stale.id.clone())
                    .exec(&txn)
                    .await?;
            }
            txn.commit().await?;
            Ok(())
        }
        .await;

        if let Err(error) = result {
            tracing::warn!("Failed to add conversion record: {error}");
        }
    }

    pub async fn clear(&self) {
        if let Err(error) = ConversionRecords::delete_many().exec(&self.db).await {
            tracing::warn!("Failed to clear conversion history: {error}");
        }
    }
}
