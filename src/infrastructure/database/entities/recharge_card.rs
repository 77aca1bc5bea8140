//! Recharge card entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recharge_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub company_id: Uuid,

    pub code: String,

    /// Lower-cased code, unique with `company_id`
    pub code_key: String,

    /// parkia, rfid, other
    pub provider: String,

    /// active, blocked, lost
    pub status: String,

    pub allow_negative: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recharge_movement::Entity")]
    Movements,
}

impl Related<super::recharge_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
