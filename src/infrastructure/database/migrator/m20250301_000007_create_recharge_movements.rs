//! Create recharge_movements table

use sea_orm_migration::prelude::*;

use super::m20250301_000006_create_recharge_cards::RechargeCards;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RechargeMovements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RechargeMovements::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RechargeMovements::CardId).uuid().not_null())
                    .col(ColumnDef::new(RechargeMovements::Sequence).big_integer().not_null())
                    .col(ColumnDef::new(RechargeMovements::Amount).string().not_null())
                    .col(ColumnDef::new(RechargeMovements::MovementType).string().not_null())
                    .col(
                        ColumnDef::new(RechargeMovements::At)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RechargeMovements::Reference).string())
                    .col(
                        ColumnDef::new(RechargeMovements::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recharge_movements_card")
                            .from(RechargeMovements::Table, RechargeMovements::CardId)
                            .to(RechargeCards::Table, RechargeCards::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recharge_movements_card_sequence")
                    .table(RechargeMovements::Table)
                    .col(RechargeMovements::CardId)
                    .col(RechargeMovements::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RechargeMovements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RechargeMovements {
    Table,
    Id,
    CardId,
    Sequence,
    Amount,
    MovementType,
    At,
    Reference,
    RecordedAt,
}
