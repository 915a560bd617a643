//! `SeaORM` Entity for the cached_charts table
//!
//! Chart points are stored as a JSON-encoded text column; the repository
//! owns the encoding.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cached_charts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub chart_key: String,
    pub coin_id: String,
    pub range: String,
    pub points: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
