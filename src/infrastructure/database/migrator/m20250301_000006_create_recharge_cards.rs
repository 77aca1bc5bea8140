//! Create recharge_cards table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RechargeCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RechargeCards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RechargeCards::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(RechargeCards::Code).string().not_null())
                    .col(ColumnDef::new(RechargeCards::CodeKey).string().not_null())
                    .col(ColumnDef::new(RechargeCards::Provider).string().not_null())
                    .col(
                        ColumnDef::new(RechargeCards::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(RechargeCards::AllowNegative)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RechargeCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RechargeCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recharge_cards_company_code")
                    .table(RechargeCards::Table)
                    .col(RechargeCards::CompanyId)
                    .col(RechargeCards::CodeKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RechargeCards::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RechargeCards {
    Table,
    Id,
    CompanyId,
    Code,
    CodeKey,
    Provider,
    Status,
    AllowNegative,
    CreatedAt,
    UpdatedAt,
}
