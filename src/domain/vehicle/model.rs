//! Vehicle domain entity and fleet aggregates

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Unit the odometer of a vehicle counts in. Display only, never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OdometerUnit {
    #[default]
    Km,
    Mi,
}

/// Operational status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VehicleStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
    Sold,
}

/// Physical/commercial condition of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VehicleCondition {
    #[default]
    New,
    SemiNew,
    Maintenance,
    Repair,
    ForSale,
    Rented,
}

impl OdometerUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Mi => "mi",
        }
    }
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [Self::Active, Self::Maintenance, Self::Inactive, Self::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
            Self::Sold => "sold",
        }
    }
}

impl VehicleCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::SemiNew => "semi_new",
            Self::Maintenance => "maintenance",
            Self::Repair => "repair",
            Self::ForSale => "for_sale",
            Self::Rented => "rented",
        }
    }
}

impl std::fmt::Display for OdometerUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for VehicleCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OdometerUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "km" => Ok(Self::Km),
            "mi" => Ok(Self::Mi),
            other => Err(DomainError::validation(
                "odometer_unit",
                format!("unknown unit '{}'", other),
            )),
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "maintenance" => Ok(Self::Maintenance),
            "inactive" => Ok(Self::Inactive),
            "sold" => Ok(Self::Sold),
            other => Err(DomainError::validation(
                "status",
                format!("unknown vehicle status '{}'", other),
            )),
        }
    }
}

impl std::str::FromStr for VehicleCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "semi_new" => Ok(Self::SemiNew),
            "maintenance" => Ok(Self::Maintenance),
            "repair" => Ok(Self::Repair),
            "for_sale" => Ok(Self::ForSale),
            "rented" => Ok(Self::Rented),
            other => Err(DomainError::validation(
                "condition",
                format!("unknown vehicle condition '{}'", other),
            )),
        }
    }
}

/// A fleet vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Licence plate, trimmed and upper-cased
    pub plate: String,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    /// Mileage declared at registration
    pub mileage: Option<i64>,
    pub odometer_unit: OdometerUnit,
    pub status: VehicleStatus,
    pub condition: VehicleCondition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a vehicle
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub company_id: Option<Uuid>,
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
    pub odometer_unit: OdometerUnit,
    pub status: VehicleStatus,
    pub condition: VehicleCondition,
}

/// Partial update. `None` leaves a field untouched; catalog references and
/// optional attributes use `Some(None)` to clear.
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub plate: Option<String>,
    pub brand_id: Option<Option<Uuid>>,
    pub model_id: Option<Option<Uuid>>,
    pub type_id: Option<Option<Uuid>>,
    pub vin: Option<Option<String>>,
    pub year: Option<Option<i32>>,
    pub color: Option<Option<String>>,
    pub acquisition_date: Option<Option<NaiveDate>>,
    pub cost: Option<Option<Decimal>>,
    pub mileage: Option<Option<i64>>,
    pub odometer_unit: Option<OdometerUnit>,
    pub status: Option<VehicleStatus>,
    pub condition: Option<VehicleCondition>,
}

/// Query filter for listing vehicles
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub company_id: Option<Uuid>,
    pub status: Option<VehicleStatus>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.company_id.map_or(true, |c| vehicle.company_id == c)
            && self.status.map_or(true, |s| vehicle.status == s)
    }
}

/// Fleet-level counts
#[derive(Debug, Clone, PartialEq)]
pub struct FleetStats {
    pub total: usize,
    pub by_status: BTreeMap<VehicleStatus, usize>,
    pub by_condition: BTreeMap<VehicleCondition, usize>,
    /// Share of `active` vehicles, 0..=100
    pub active_percentage: f64,
}

impl FleetStats {
    /// Pure aggregation over a vehicle collection
    pub fn from_vehicles<'a>(vehicles: impl IntoIterator<Item = &'a Vehicle>) -> Self {
        let mut by_status: BTreeMap<VehicleStatus, usize> =
            VehicleStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_condition = BTreeMap::new();
        let mut total = 0;

        for vehicle in vehicles {
            total += 1;
            *by_status.entry(vehicle.status).or_insert(0) += 1;
            *by_condition.entry(vehicle.condition).or_insert(0) += 1;
        }

        let active = by_status.get(&VehicleStatus::Active).copied().unwrap_or(0);
        Self {
            total,
            by_status,
            by_condition,
            active_percentage: percentage(active, total),
        }
    }
}

pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(status: VehicleStatus, condition: VehicleCondition) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            plate: "1234ABC".into(),
            brand_id: None,
            model_id: None,
            type_id: None,
            vin: None,
            year: None,
            color: None,
            acquisition_date: None,
            cost: None,
            mileage: None,
            odometer_unit: OdometerUnit::Km,
            status,
            condition,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fleet_stats_counts_by_status() {
        let fleet = vec![
            vehicle(VehicleStatus::Active, VehicleCondition::New),
            vehicle(VehicleStatus::Active, VehicleCondition::Rented),
            vehicle(VehicleStatus::Maintenance, VehicleCondition::Repair),
            vehicle(VehicleStatus::Sold, VehicleCondition::ForSale),
        ];
        let stats = FleetStats::from_vehicles(&fleet);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status[&VehicleStatus::Active], 2);
        assert_eq!(stats.by_status[&VehicleStatus::Inactive], 0);
        assert_eq!(stats.by_condition[&VehicleCondition::Repair], 1);
        assert!((stats.active_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_fleet_has_zero_percentage() {
        let stats = FleetStats::from_vehicles(std::iter::empty());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.active_percentage, 0.0);
    }

    #[test]
    fn enums_round_trip_through_strings() {
        assert_eq!("semi_new".parse::<VehicleCondition>().unwrap(), VehicleCondition::SemiNew);
        assert_eq!(VehicleCondition::ForSale.to_string(), "for_sale");
        assert_eq!("MI".parse::<OdometerUnit>().unwrap(), OdometerUnit::Mi);
        assert!("parked".parse::<VehicleStatus>().is_err());
    }
}
