//! Create vehicle_models table

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_brands::Brands;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleModels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VehicleModels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VehicleModels::Name).string().not_null())
                    .col(ColumnDef::new(VehicleModels::NameKey).string().not_null())
                    .col(ColumnDef::new(VehicleModels::BrandId).uuid().not_null())
                    .col(ColumnDef::new(VehicleModels::TypeId).uuid())
                    .col(ColumnDef::new(VehicleModels::Year).integer())
                    .col(
                        ColumnDef::new(VehicleModels::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(VehicleModels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleModels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_models_brand")
                            .from(VehicleModels::Table, VehicleModels::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Model names are unique within their brand
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_models_brand_name_key")
                    .table(VehicleModels::Table)
                    .col(VehicleModels::BrandId)
                    .col(VehicleModels::NameKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleModels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum VehicleModels {
    Table,
    Id,
    Name,
    NameKey,
    BrandId,
    TypeId,
    Year,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
