//! Create vehicles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vehicles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vehicles::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Vehicles::Plate).string().not_null())
                    .col(ColumnDef::new(Vehicles::BrandId).uuid())
                    .col(ColumnDef::new(Vehicles::ModelId).uuid())
                    .col(ColumnDef::new(Vehicles::TypeId).uuid())
                    .col(ColumnDef::new(Vehicles::Vin).string())
                    .col(ColumnDef::new(Vehicles::Year).integer())
                    .col(ColumnDef::new(Vehicles::Color).string())
                    .col(ColumnDef::new(Vehicles::AcquisitionDate).date())
                    .col(ColumnDef::new(Vehicles::Cost).string())
                    .col(ColumnDef::new(Vehicles::Mileage).big_integer())
                    .col(
                        ColumnDef::new(Vehicles::OdometerUnit)
                            .string()
                            .not_null()
                            .default("km"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Condition)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_company")
                    .table(Vehicles::Table)
                    .col(Vehicles::CompanyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    CompanyId,
    Plate,
    BrandId,
    ModelId,
    TypeId,
    Vin,
    Year,
    Color,
    AcquisitionDate,
    Cost,
    Mileage,
    OdometerUnit,
    Status,
    Condition,
    CreatedAt,
    UpdatedAt,
}
