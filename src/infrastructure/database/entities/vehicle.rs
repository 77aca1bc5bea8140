//! Vehicle entity

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub company_id: Uuid,

    /// Upper-cased licence plate
    pub plate: String,

    pub brand_id: Option<Uuid>,

    pub model_id: Option<Uuid>,

    pub type_id: Option<Uuid>,

    pub vin: Option<String>,

    pub year: Option<i32>,

    pub color: Option<String>,

    pub acquisition_date: Option<NaiveDate>,

    /// Decimal rendered as text
    pub cost: Option<String>,

    pub mileage: Option<i64>,

    /// "km" or "mi"
    pub odometer_unit: String,

    /// active, maintenance, inactive, sold
    pub status: String,

    pub condition: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::odometer_reading::Entity")]
    OdometerReadings,
}

impl Related<super::odometer_reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OdometerReadings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
