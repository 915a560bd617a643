use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Order, QueryOrder, Set};

use crate::entities::{favorites, prelude::*};
use crate::models::market::{CoinMarket, Favorite};

#[derive(Clone)]
pub struct FavoritesRepository {
    db: DatabaseConnection,
}

impl FavoritesRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn favorites(&self) -> Vec<Favorite> {
        match Favorites::find()
            .order_by(favorites::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|row| Favorite {
                    coin_id: row.coin_id,
                    name: row.name,
                    symbol: row.symbol,
                    image_url: row.image_url,
                    created_at: row.created_at,
                })
                .collect(),
            Err(error) => {
                tracing::warn!("Failed to read favorites: {error}");
                Vec::new()
            }
        }
    }

    pub async fn is_favorite(&self, coin_id: &str) -> bool {
        matches!(Favorites::find_by_id(coin_id).one(&self.db).await, Ok(Some(_)))
    }

    pub async fn add_favorite(&self, coin: &CoinMarket) {
        let row = favorites::ActiveModel {
            coin_id: Set(coin.id.clone()),
            name: Set(coin.name.clone()),
            symbol: Set(coin.symbol.clone()),
            image_url: Set(coin.image_url.clone()),
            created_at: Set(Utc::now()),
        };
        let result = Favorites::insert(row)
            .on_conflict(
                OnConflict::column(favorites::Column::CoinId)
                    .update_columns([
                        favorites::Column::Name,
                        favorites::Column::Symbol,
                        favorites::Column::ImageUrl,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await;
        if let Err(error) = result {
            tracing::warn!("Failed to add favorite: {error}");
        }
    }

    pub async fn remove_favorite(&self, coin_id: &str) {
        if let Err(error) = Favorites::delete_by_id(coin_id).exec(&self.db).await {
            tracing::warn!("Failed to remove favorite: {error}");
        }
    }
}
