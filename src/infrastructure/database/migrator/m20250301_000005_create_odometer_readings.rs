//! Create odometer_readings table

use sea_orm_migration::prelude::*;

use super::m20250301_000004_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OdometerReadings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OdometerReadings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OdometerReadings::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(OdometerReadings::Sequence).big_integer().not_null())
                    .col(ColumnDef::new(OdometerReadings::Value).big_integer().not_null())
                    .col(ColumnDef::new(OdometerReadings::Source).string().not_null())
                    .col(
                        ColumnDef::new(OdometerReadings::At)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OdometerReadings::Note).string())
                    .col(
                        ColumnDef::new(OdometerReadings::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_odometer_readings_vehicle")
                            .from(OdometerReadings::Table, OdometerReadings::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per ledger position; a second writer at the same
        // position fails here
        manager
            .create_index(
                Index::create()
                    .name("idx_odometer_readings_vehicle_sequence")
                    .table(OdometerReadings::Table)
                    .col(OdometerReadings::VehicleId)
                    .col(OdometerReadings::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OdometerReadings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum OdometerReadings {
    Table,
    Id,
    VehicleId,
    Sequence,
    Value,
    Source,
    At,
    Note,
    RecordedAt,
}
