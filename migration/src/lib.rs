pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_cache_tables;
mod m20260301_000002_create_price_alerts;
mod m20260301_000003_create_user_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_cache_tables::Migration),
            Box::new(m20260301_000002_create_price_alerts::Migration),
            Box::new(m20260301_000003_create_user_tables::Migration),
        ]
    }
}
