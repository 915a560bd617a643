//! `SeaORM` Entity for the price_alerts table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub target_value: f64,
    pub metric: String,      // "price" | "percent_change_24h"
    pub direction: String,   // "above" | "below"
    pub repeat_mode: String, // "once_until_reset" | "repeat_with_cooldown"
    pub cooldown_minutes: i32,
    pub is_enabled: bool,
    pub is_armed: bool,
    pub created_at: DateTimeUtc,
    pub last_triggered_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
