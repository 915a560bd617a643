use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CachedMarkets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CachedMarkets::CoinId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CachedMarkets::Name).string().not_null())
                    .col(ColumnDef::new(CachedMarkets::Symbol).string().not_null())
                    .col(ColumnDef::new(CachedMarkets::ImageUrl).string())
                    .col(
                        ColumnDef::new(CachedMarkets::CurrentPrice)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CachedMarkets::PriceChangePercentage24h)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CachedMarkets::MarketCap).double())
                    .col(ColumnDef::new(CachedMarkets::TotalVolume).double())
                    .col(ColumnDef::new(CachedMarkets::High24h).double())
                    .col(ColumnDef::new(CachedMarkets::Low24h).double())
                    .col(ColumnDef::new(CachedMarkets::LastUpdated).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CachedMarkets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CachedCoinDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CachedCoinDetails::CoinId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CachedCoinDetails::Name).string().not_null())
                    .col(ColumnDef::new(CachedCoinDetails::Symbol).string().not_null())
                    .col(
                        ColumnDef::new(CachedCoinDetails::Description)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CachedCoinDetails::ImageUrl).string())
                    .col(
                        ColumnDef::new(CachedCoinDetails::CurrentPrice)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CachedCoinDetails::PriceChangePercentage24h)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CachedCoinDetails::MarketCap).double())
                    .col(ColumnDef::new(CachedCoinDetails::TotalVolume).double())
                    .col(ColumnDef::new(CachedCoinDetails::High24h).double())
                    .col(ColumnDef::new(CachedCoinDetails::Low24h).double())
                    .col(ColumnDef::new(CachedCoinDetails::CirculatingSupply).double())
                    .col(ColumnDef::new(CachedCoinDetails::LastUpdated).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CachedCoinDetails::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CachedCharts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CachedCharts::ChartKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CachedCharts::CoinId).string().not_null())
                    .col(ColumnDef::new(CachedCharts::Range).string().not_null())
                    .col(ColumnDef::new(CachedCharts::Points).text().not_null())
                    .col(
                        ColumnDef::new(CachedCharts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cached_charts_coin_id")
                    .table(CachedCharts::Table)
                    .col(CachedCharts::CoinId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CacheMeta::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CacheMeta::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CacheMeta::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CacheMeta::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CachedCharts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CachedCoinDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CachedMarkets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CachedMarkets {
    Table,
    CoinId,
    Name,
    Symbol,
    ImageUrl,
    CurrentPrice,
    #[sea_orm(iden = "price_change_percentage_24h")]
    PriceChangePercentage24h,
    MarketCap,
    TotalVolume,
    #[sea_orm(iden = "high_24h")]
    High24h,
    #[sea_orm(iden = "low_24h")]
    Low24h,
    LastUpdated,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CachedCoinDetails {
    Table,
    CoinId,
    Name,
    Symbol,
    Description,
    ImageUrl,
    CurrentPrice,
    #[sea_orm(iden = "price_change_percentage_24h")]
    PriceChangePercentage24h,
    MarketCap,
    TotalVolume,
    #[sea_orm(iden = "high_24h")]
    High24h,
    #[sea_orm(iden = "low_24h")]
    Low24h,
    CirculatingSupply,
    LastUpdated,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CachedCharts {
    Table,
    ChartKey,
    CoinId,
    Range,
    Points,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CacheMeta {
    Table,
    Key,
    UpdatedAt,
}
