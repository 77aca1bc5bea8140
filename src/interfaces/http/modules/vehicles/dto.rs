//! Vehicle DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{DomainResult, FleetStats, NewVehicle, Vehicle, VehicleFilter, VehiclePatch};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_opt<T>(raw: Option<String>) -> DomainResult<Option<T>>
where
    T: std::str::FromStr<Err = crate::domain::DomainError>,
{
    raw.map(|s| s.parse()).transpose()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plate: String,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub mileage: Option<i64>,
    /// "km" or "mi"
    pub odometer_unit: String,
    /// active, maintenance, inactive, sold
    pub status: String,
    /// new, semi_new, maintenance, repair, for_sale, rented
    pub condition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            company_id: v.company_id,
            plate: v.plate,
            brand_id: v.brand_id,
            model_id: v.model_id,
            type_id: v.type_id,
            vin: v.vin,
            year: v.year,
            color: v.color,
            acquisition_date: v.acquisition_date,
            cost: v.cost,
            mileage: v.mileage,
            odometer_unit: v.odometer_unit.to_string(),
            status: v.status.to_string(),
            condition: v.condition.to_string(),
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "plate is required"))]
    pub plate: String,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub vin: Option<String>,
    pub year: Option<i32>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub mileage: Option<i64>,
    pub odometer_unit: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
}

impl CreateVehicleRequest {
    pub fn into_new_vehicle(self) -> DomainResult<NewVehicle> {
        Ok(NewVehicle {
            company_id: self.company_id,
            plate: self.plate,
            brand_id: self.brand_id,
            model_id: self.model_id,
            type_id: self.type_id,
            vin: self.vin,
            year: self.year,
            color: self.color,
            acquisition_date: self.acquisition_date,
            cost: self.cost,
            mileage: self.mileage,
            odometer_unit: parse_opt(self.odometer_unit)?.unwrap_or_default(),
            status: parse_opt(self.status)?.unwrap_or_default(),
            condition: parse_opt(self.condition)?.unwrap_or_default(),
        })
    }
}

/// Partial update. Omitted fields stay as they are, `null` clears.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 20))]
    pub plate: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub brand_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub model_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub type_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub vin: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub acquisition_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cost: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub mileage: Option<Option<i64>>,
    pub odometer_unit: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
}

impl UpdateVehicleRequest {
    pub fn into_patch(self) -> DomainResult<VehiclePatch> {
        Ok(VehiclePatch {
            plate: self.plate,
            brand_id: self.brand_id,
            model_id: self.model_id,
            type_id: self.type_id,
            vin: self.vin,
            year: self.year,
            color: self.color,
            acquisition_date: self.acquisition_date,
            cost: self.cost,
            mileage: self.mileage,
            odometer_unit: parse_opt(self.odometer_unit)?,
            status: parse_opt(self.status)?,
            condition: parse_opt(self.condition)?,
        })
    }
}

/// `?company_id=&status=` filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VehicleListQuery {
    pub company_id: Option<Uuid>,
    /// active, maintenance, inactive, sold
    pub status: Option<String>,
}

impl VehicleListQuery {
    pub fn filter(&self) -> DomainResult<VehicleFilter> {
        Ok(VehicleFilter {
            company_id: self.company_id,
            status: parse_opt(self.status.clone())?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FleetStatsDto {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_condition: BTreeMap<String, usize>,
    /// Share of active vehicles, 0..=100
    pub active_percentage: f64,
}

impl From<FleetStats> for FleetStatsDto {
    fn from(stats: FleetStats) -> Self {
        Self {
            total: stats.total,
            by_status: stats
                .by_status
                .into_iter()
                .map(|(status, n)| (status.to_string(), n))
                .collect(),
            by_condition: stats
                .by_condition
                .into_iter()
                .map(|(condition, n)| (condition.to_string(), n))
                .collect(),
            active_percentage: stats.active_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VehicleStatus;

    #[test]
    fn null_clears_and_absence_keeps() {
        let req: UpdateVehicleRequest =
            serde_json::from_str(r#"{"model_id": null, "status": "sold"}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.model_id, Some(None));
        assert_eq!(patch.brand_id, None);
        assert_eq!(patch.status, Some(VehicleStatus::Sold));
    }

    #[test]
    fn unknown_enum_value_is_a_validation_error() {
        let req: UpdateVehicleRequest = serde_json::from_str(r#"{"condition": "wrecked"}"#).unwrap();
        let err = req.into_patch().unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }
}
