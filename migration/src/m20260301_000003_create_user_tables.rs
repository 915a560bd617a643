use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favorites::CoinId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favorites::Name).string().not_null())
                    .col(ColumnDef::new(Favorites::Symbol).string().not_null())
                    .col(ColumnDef::new(Favorites::ImageUrl).string())
                    .col(
                        ColumnDef::new(Favorites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Holdings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Holdings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Holdings::CoinId).string().not_null())
                    .col(ColumnDef::new(Holdings::Symbol).string().not_null())
                    .col(ColumnDef::new(Holdings::Name).string().not_null())
                    .col(ColumnDef::new(Holdings::Amount).double().not_null())
                    .col(ColumnDef::new(Holdings::AvgBuyPrice).double())
                    .col(
                        ColumnDef::new(Holdings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Holdings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CoinNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoinNotes::NoteId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoinNotes::CoinId).string().not_null())
                    .col(ColumnDef::new(CoinNotes::CoinName).string().not_null())
                    .col(ColumnDef::new(CoinNotes::CoinSymbol).string().not_null())
                    .col(ColumnDef::new(CoinNotes::Text).text().not_null())
                    .col(
                        ColumnDef::new(CoinNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoinNotes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coin_notes_coin_id")
                    .table(CoinNotes::Table)
                    .col(CoinNotes::CoinId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecentSearches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecentSearches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecentSearches::Query).string().not_null())
                    .col(
                        ColumnDef::new(RecentSearches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConversionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversionRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConversionRecords::CoinId).string().not_null())
                    .col(ColumnDef::new(ConversionRecords::Symbol).string().not_null())
                    .col(ColumnDef::new(ConversionRecords::Name).string().not_null())
                    .col(
                        ColumnDef::new(ConversionRecords::UsdAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversionRecords::CoinAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversionRecords::CreatedAt)
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
            .drop_table(Table::drop().table(ConversionRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecentSearches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CoinNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Holdings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    CoinId,
    Name,
    Symbol,
    ImageUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Holdings {
    Table,
    Id,
    CoinId,
    Symbol,
    Name,
    Amount,
    AvgBuyPrice,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CoinNotes {
    Table,
    NoteId,
    CoinId,
    CoinName,
    CoinSymbol,
    Text,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RecentSearches {
    Table,
    Id,
    Query,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ConversionRecords {
    Table,
    Id,
    CoinId,
    Symbol,
    Name,
    UsdAmount,
    CoinAmount,
    CreatedAt,
}
