use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriceAlerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceAlerts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceAlerts::CoinId).string().not_null())
                    .col(ColumnDef::new(PriceAlerts::Symbol).string().not_null())
                    .col(ColumnDef::new(PriceAlerts::Name).string().not_null())
                    .col(ColumnDef::new(PriceAlerts::TargetValue).double().not_null())
                    .col(ColumnDef::new(PriceAlerts::Metric).string().not_null())
                    .col(ColumnDef::new(PriceAlerts::Direction).string().not_null())
                    .col(ColumnDef::new(PriceAlerts::RepeatMode).string().not_null())
                    .col(
                        ColumnDef::new(PriceAlerts::CooldownMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PriceAlerts::IsEnabled).boolean().not_null())
                    .col(ColumnDef::new(PriceAlerts::IsArmed).boolean().not_null())
                    .col(
                        ColumnDef::new(PriceAlerts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceAlerts::LastTriggeredAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_alerts_coin_id")
                    .table(PriceAlerts::Table)
                    .col(PriceAlerts::CoinId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceAlerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PriceAlerts {
    Table,
    Id,
    CoinId,
    Symbol,
    Name,
    TargetValue,
    Metric,
    Direction,
    RepeatMode,
    CooldownMinutes,
    IsEnabled,
    IsArmed,
    CreatedAt,
    LastTriggeredAt,
}
