use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Order, QueryOrder, Set};

use crate::entities::{holdings, prelude::*};
use crate::models::market::Holding;

#[derive(Clone)]
pub struct PortfolioRepository {
    db: DatabaseConnection,
}

impl PortfolioRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn holdings(&self) -> Vec<Holding> {
        match Holdings::find()
            .order_by(holdings::Column::UpdatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows.into_iter().map(holding_to_domain).collect(),
            Err(error) => {
                tracing::warn!("Failed to read holdings: {error}");
                Vec::new()
            }
        }
    }

    pub async fn holding(&self, id: &str) -> Option<Holding> {
        match Holdings::find_by_id(id).one(&self.db).await {
            Ok(row) => row.map(holding_to_domain),
            Err(_) => None,
        }
    }

    pub async fn upsert_holding(&self, holding: &Holding) {
        let row = holdings::ActiveModel {
            id: Set(holding.id.clone()),
            coin_id: Set(holding.coin_id.clone()),
            symbol: Set(holding.symbol.clone()),
            name: Set(holding.name.clone()),
            amount: Set(holding.amount),
            avg_buy_price: Set(holding.avg_buy_price),
            created_at: Set(holding.created_at),
            updated_at: Set(holding.updated_at),
        };
        let result = Holdings::insert(row)
            .on_conflict(
                OnConflict::column(holdings::Column::Id)
                    .update_columns([
                        holdings::Column::CoinId,
                        holdings::Column::Symbol,
                        holdings::Column::Name,
                        holdings::Column::Amount,
                        holdings::Column::AvgBuyPrice,
                        holdings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await;
        if let Err(error) = result {
            tracing::warn!("Failed to upsert holding: {error}");
        }
    }

    pub async fn delete_holding(&self, id: &str) {
        if let Err(error) = Holdings::delete_by_id(id).exec(&self.db).await {
            tracing::warn!("Failed to delete holding: {error}");
        }
    }
}

fn holding_to_domain(model: holdings::Model) -> Holding {
    Holding {
        id: model.id,
        coin_id: model.coin_id,
        symbol: model.symbol,
        name: model.name,
        amount: model.amount,
        avg_buy_price: model.avg_buy_price,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
