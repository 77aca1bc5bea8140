//! Create brands table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Brands::Name).string().not_null())
                    .col(ColumnDef::new(Brands::NameKey).string().not_null())
                    .col(ColumnDef::new(Brands::Description).string())
                    .col(
                        ColumnDef::new(Brands::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Brands::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Brands::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Case-insensitive uniqueness of brand names
        manager
            .create_index(
                Index::create()
                    .name("idx_brands_name_key")
                    .table(Brands::Table)
                    .col(Brands::NameKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Brands {
    Table,
    Id,
    Name,
    NameKey,
    Description,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
