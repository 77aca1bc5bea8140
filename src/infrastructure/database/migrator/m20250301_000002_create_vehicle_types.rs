//! Create vehicle_types table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VehicleTypes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VehicleTypes::Name).string().not_null())
                    .col(ColumnDef::new(VehicleTypes::NameKey).string().not_null())
                    .col(ColumnDef::new(VehicleTypes::Description).string().not_null())
                    .col(
                        ColumnDef::new(VehicleTypes::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(VehicleTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_types_name_key")
                    .table(VehicleTypes::Table)
                    .col(VehicleTypes::NameKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleTypes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehicleTypes {
    Table,
    Id,
    Name,
    NameKey,
    Description,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
