use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{coin_notes, prelude::*};
use crate::models::market::CoinNote;

#[derive(Clone)]
pub struct NotesRepository {
    db: DatabaseConnection,
}

impl NotesRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn notes_for(&self, coin_id: &str) -> Vec<CoinNote> {
        match CoinNotes::find()
            .filter(coin_notes::Column::CoinId.eq(coin_id))
            .order_by(coin_notes::Column::UpdatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows.into_iter().map(note_to_domain).collect(),
            Err(error) => {
                tracing::warn!("Failed to read notes: {error}");
                Vec::new()
            }
        }
    }

    pub async fn all_notes(&self) -> Vec<CoinNote> {
        match CoinNotes::find()
            .order_by(coin_notes::Column::UpdatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows.into_iter().map(note_to_domain).collect(),
            Err(error) => {
                tracing::warn!("Failed to read all notes: {error}");
                Vec::new()
            }
        }
    }

    pub async fn upsert_note(&self, note: &CoinNote) {
        let row = coin_notes::ActiveModel {
            note_id: Set(note.id.clone()),
            coin_id: Set(note.coin_id.clone()),
            coin_name: Set(note.coin_name.clone()),
            coin_symbol: Set(note.coin_symbol.clone()),
            text: Set(note.text.clone()),
            created_at: Set(note.created_at),
            updated_at: Set(note.updated_at),
        };
        let result = CoinNotes::insert(row)
            .on_conflict(
                OnConflict::column(coin_notes::Column::NoteId)
                    .update_columns([
                        coin_notes::Column::CoinName,
                        coin_notes::Column::CoinSymbol,
                        coin_notes::Column::Text,
                        coin_notes::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await;
        if let Err(error) = result {
            tracing::warn!("Failed to upsert note: {error}");
        }
    }

    pub async fn add_note(
        &self,
        coin_id: &str,
        coin_name: &str,
        coin_symbol: &str,
        text: &str,
    ) -> CoinNote {
        let now = Utc::now();
        let note = CoinNote {
            id: Uuid::new_v4().to_string(),
            coin_id: coin_id.to_string(),
            coin_name: coin_name.to_string(),
            coin_symbol: coin_symbol.to_uppercase(),
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.upsert_note(&note).await;
        note
    }

    pub async fn delete_note(&self, id: &str) {
        if let Err(error) = CoinNotes::delete_by_id(id).exec(&self.db).await {
            tracing::warn!("Failed to delete note: {error}");
        }
    }

    pub async fn delete_notes_for(&self, coin_id: &str) {
        let result = CoinNotes::delete_many()
            .filter(coin_notes::Column::CoinId.eq(coin_id))
            .exec(&self.db)
            .await;
        if let Err(error) = result {
            tracing::warn!("Failed to delete notes by coin: {error}");
        }
    }
}

fn note_to_domain(model: coin_notes::Model) -> CoinNote {
    CoinNote {
        id: model.note_id,
        coin_id: model.coin_id,
        coin_name: model.coin_name,
        coin_symbol: model.coin_symbol,
        text: model.text,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
