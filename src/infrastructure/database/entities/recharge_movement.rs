//! Recharge movement entity (append-only)

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recharge_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub card_id: Uuid,

    pub sequence: i64,

    /// Positive decimal rendered as text
    pub amount: String,

    /// credit or debit
    pub movement_type: String,

    pub at: DateTime<Utc>,

    pub reference: Option<String>,

    pub recorded_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recharge_card::Entity",
        from = "Column::CardId",
        to = "super::recharge_card::Column::Id"
    )]
    Card,
}

impl Related<super::recharge_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Card.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
