//! Vehicle registry
//!
//! Validates vehicle input and its catalog references, and aggregates fleet
//! statistics.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::{resolve_reference, validate_year};
use crate::config::FleetSettings;
use crate::domain::{
    Brand, DomainError, DomainResult, FleetStats, NewVehicle, RepositoryProvider, Vehicle,
    VehicleFilter, VehicleModel, VehiclePatch, VehicleType,
};
use crate::shared::validations::{optional_text, require_text, validate_vin};
use crate::shared::with_deadline;

/// Which catalog references an operation assigns
#[derive(Debug, Clone, Copy, Default)]
struct Assigned {
    brand: bool,
    model: bool,
    vehicle_type: bool,
}

impl Assigned {
    const ALL: Assigned = Assigned {
        brand: true,
        model: true,
        vehicle_type: true,
    };

    fn any(&self) -> bool {
        self.brand || self.model || self.vehicle_type
    }
}

pub struct VehicleRegistry {
    repos: Arc<dyn RepositoryProvider>,
    settings: FleetSettings,
}

impl VehicleRegistry {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: FleetSettings) -> Self {
        Self { repos, settings }
    }

    /// Register a vehicle. Nothing is persisted unless every check passes.
    pub async fn create(&self, input: NewVehicle) -> DomainResult<Vehicle> {
        let company_id = input
            .company_id
            .ok_or_else(|| DomainError::validation("company_id", "is required"))?;
        let plate = normalize_plate(&input.plate)?;
        let vin = input.vin.map(|v| validate_vin(&v)).transpose()?;
        if let Some(year) = input.year {
            validate_year(&self.settings, year)?;
        }
        if let Some(mileage) = input.mileage {
            validate_mileage(mileage)?;
        }
        if let Some(cost) = input.cost {
            validate_cost(cost)?;
        }

        let now = Utc::now();
        let mut vehicle = Vehicle {
            id: Uuid::new_v4(),
            company_id,
            plate,
            brand_id: input.brand_id,
            model_id: input.model_id,
            type_id: input.type_id,
            vin,
            year: input.year,
            color: optional_text(input.color),
            acquisition_date: input.acquisition_date,
            cost: input.cost,
            mileage: input.mileage,
            odometer_unit: input.odometer_unit,
            status: input.status,
            condition: input.condition,
            created_at: now,
            updated_at: now,
        };
        self.check_references(&mut vehicle, Assigned::ALL).await?;

        let created = self
            .store("vehicles.create", self.repos.vehicles().create(vehicle))
            .await?;
        info!(
            vehicle_id = %created.id,
            company_id = %created.company_id,
            plate = %created.plate,
            "Vehicle registered"
        );
        Ok(created)
    }

    /// Apply a partial update, validating only the fields it touches
    pub async fn update(&self, id: Uuid, patch: VehiclePatch) -> DomainResult<Vehicle> {
        let mut vehicle = self.get(id).await?;
        let assigned = Assigned {
            brand: patch.brand_id.is_some(),
            model: patch.model_id.is_some(),
            vehicle_type: patch.type_id.is_some(),
        };

        if let Some(plate) = patch.plate {
            vehicle.plate = normalize_plate(&plate)?;
        }
        if let Some(vin) = patch.vin {
            vehicle.vin = vin.map(|v| validate_vin(&v)).transpose()?;
        }
        if let Some(year) = patch.year {
            if let Some(year) = year {
                validate_year(&self.settings, year)?;
            }
            vehicle.year = year;
        }
        if let Some(mileage) = patch.mileage {
            if let Some(mileage) = mileage {
                validate_mileage(mileage)?;
            }
            vehicle.mileage = mileage;
        }
        if let Some(cost) = patch.cost {
            if let Some(cost) = cost {
                validate_cost(cost)?;
            }
            vehicle.cost = cost;
        }
        if let Some(color) = patch.color {
            vehicle.color = optional_text(color);
        }
        if let Some(date) = patch.acquisition_date {
            vehicle.acquisition_date = date;
        }
        if let Some(unit) = patch.odometer_unit {
            vehicle.odometer_unit = unit;
        }
        if let Some(status) = patch.status {
            vehicle.status = status;
        }
        if let Some(condition) = patch.condition {
            vehicle.condition = condition;
        }
        if let Some(brand_id) = patch.brand_id {
            vehicle.brand_id = brand_id;
        }
        if let Some(model_id) = patch.model_id {
            vehicle.model_id = model_id;
        }
        if let Some(type_id) = patch.type_id {
            vehicle.type_id = type_id;
        }
        self.check_references(&mut vehicle, assigned).await?;

        vehicle.updated_at = Utc::now();
        let updated = self
            .store("vehicles.update", self.repos.vehicles().update(vehicle))
            .await?;
        info!(vehicle_id = %id, status = %updated.status, "Vehicle updated");
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Vehicle> {
        self.store("vehicles.find_by_id", self.repos.vehicles().find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    /// Vehicles matching `filter`, ordered by plate
    pub async fn list(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>> {
        self.store("vehicles.query", self.repos.vehicles().query(filter))
            .await
    }

    /// Pure aggregation, no store access
    pub fn compute_fleet_stats(vehicles: &[Vehicle]) -> FleetStats {
        FleetStats::from_vehicles(vehicles)
    }

    /// Statistics over the vehicles matching `filter`
    pub async fn fleet_stats(&self, filter: &VehicleFilter) -> DomainResult<FleetStats> {
        let vehicles = self.list(filter).await?;
        Ok(Self::compute_fleet_stats(&vehicles))
    }

    /// Resolve the vehicle's catalog references.
    ///
    /// Every reference must exist; newly assigned ones must also be enabled.
    /// A model fixes the brand (inferred when absent) and, if it has one,
    /// the vehicle type.
    async fn check_references(&self, vehicle: &mut Vehicle, assigned: Assigned) -> DomainResult<()> {
        if !assigned.any() {
            return Ok(());
        }
        let timeout = self.settings.store_timeout;

        if let Some(brand_id) = vehicle.brand_id {
            resolve_reference::<Brand, _>(self.repos.brands(), brand_id, assigned.brand, timeout)
                .await?;
        }
        if let Some(type_id) = vehicle.type_id {
            resolve_reference::<VehicleType, _>(
                self.repos.vehicle_types(),
                type_id,
                assigned.vehicle_type,
                timeout,
            )
            .await?;
        }
        let Some(model_id) = vehicle.model_id else {
            return Ok(());
        };
        let model =
            resolve_reference::<VehicleModel, _>(self.repos.models(), model_id, assigned.model, timeout)
                .await?;

        match vehicle.brand_id {
            Some(brand_id) if brand_id != model.brand_id => {
                warn!(%model_id, %brand_id, model_brand = %model.brand_id, "Model does not belong to brand");
                return Err(DomainError::cross_reference(
                    "model_id",
                    format!("model {} belongs to brand {}, not {}", model_id, model.brand_id, brand_id),
                ));
            }
            Some(_) => {}
            None => vehicle.brand_id = Some(model.brand_id),
        }
        if let (Some(model_type), Some(type_id)) = (model.type_id, vehicle.type_id) {
            if model_type != type_id {
                return Err(DomainError::cross_reference(
                    "type_id",
                    format!("model {} is of type {}, not {}", model_id, model_type, type_id),
                ));
            }
        }
        Ok(())
    }

    async fn store<T>(
        &self,
        operation: &'static str,
        call: impl std::future::Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        with_deadline(self.settings.store_timeout, operation, call).await
    }
}

fn normalize_plate(plate: &str) -> DomainResult<String> {
    Ok(require_text("plate", plate)?.to_uppercase())
}

fn validate_mileage(mileage: i64) -> DomainResult<()> {
    if mileage < 0 {
        return Err(DomainError::validation("mileage", format!("{} is negative", mileage)));
    }
    Ok(())
}

fn validate_cost(cost: Decimal) -> DomainResult<()> {
    if cost < Decimal::ZERO {
        return Err(DomainError::validation("cost", format!("{} is negative", cost)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CatalogService;
    use crate::domain::{CatalogKind, VehicleCondition, VehicleStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    struct Fixture {
        catalog: CatalogService,
        registry: VehicleRegistry,
        company: Uuid,
    }

    fn fixture() -> Fixture {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        Fixture {
            catalog: CatalogService::new(repos.clone(), FleetSettings::default()),
            registry: VehicleRegistry::new(repos, FleetSettings::default()),
            company: Uuid::new_v4(),
        }
    }

    fn new_vehicle(company: Uuid, plate: &str) -> NewVehicle {
        NewVehicle {
            company_id: Some(company),
            plate: plate.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn plate_and_company_are_required() {
        let f = fixture();
        let no_company = NewVehicle {
            plate: "1234ABC".into(),
            ..Default::default()
        };
        assert!(matches!(
            f.registry.create(no_company).await,
            Err(DomainError::Validation { field: "company_id", .. })
        ));
        assert!(matches!(
            f.registry.create(new_vehicle(f.company, "   ")).await,
            Err(DomainError::Validation { field: "plate", .. })
        ));
    }

    #[tokio::test]
    async fn plate_is_normalized() {
        let f = fixture();
        let vehicle = f.registry.create(new_vehicle(f.company, " 1234abc ")).await.unwrap();
        assert_eq!(vehicle.plate, "1234ABC");
        assert_eq!(f.registry.get(vehicle.id).await.unwrap(), vehicle);
    }

    #[tokio::test]
    async fn numeric_fields_are_range_checked() {
        let f = fixture();
        let mut input = new_vehicle(f.company, "A1");
        input.year = Some(1899);
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::Validation { field: "year", .. })
        ));

        let mut input = new_vehicle(f.company, "A1");
        input.mileage = Some(-1);
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::Validation { field: "mileage", .. })
        ));

        let mut input = new_vehicle(f.company, "A1");
        input.cost = Some(Decimal::from(-5));
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::Validation { field: "cost", .. })
        ));
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let f = fixture();
        let mut input = new_vehicle(f.company, "A1");
        input.brand_id = Some(Uuid::new_v4());
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::ReferentialIntegrity { entity: "Brand", .. })
        ));
    }

    #[tokio::test]
    async fn model_from_another_brand_is_a_cross_reference_error() {
        let f = fixture();
        let toyota = f.catalog.create_brand("Toyota", None).await.unwrap();
        let ford = f.catalog.create_brand("Ford", None).await.unwrap();
        let focus = f.catalog.create_model("Focus", ford.id, None, None).await.unwrap();

        let mut input = new_vehicle(f.company, "A1");
        input.brand_id = Some(toyota.id);
        input.model_id = Some(focus.id);
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::CrossReference { field: "model_id", .. })
        ));
        assert!(f.registry.list(&VehicleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn brand_is_inferred_from_model() {
        let f = fixture();
        let ford = f.catalog.create_brand("Ford", None).await.unwrap();
        let focus = f.catalog.create_model("Focus", ford.id, None, None).await.unwrap();

        let mut input = new_vehicle(f.company, "A1");
        input.model_id = Some(focus.id);
        let vehicle = f.registry.create(input).await.unwrap();
        assert_eq!(vehicle.brand_id, Some(ford.id));
    }

    #[tokio::test]
    async fn model_type_must_agree_with_vehicle_type() {
        let f = fixture();
        let ford = f.catalog.create_brand("Ford", None).await.unwrap();
        let van = f.catalog.create_type("Van", "Light commercial").await.unwrap();
        let car = f.catalog.create_type("Car", "Passenger").await.unwrap();
        let transit = f
            .catalog
            .create_model("Transit", ford.id, Some(van.id), None)
            .await
            .unwrap();

        let mut input = new_vehicle(f.company, "A1");
        input.model_id = Some(transit.id);
        input.type_id = Some(car.id);
        assert!(matches!(
            f.registry.create(input).await,
            Err(DomainError::CrossReference { field: "type_id", .. })
        ));
    }

    #[tokio::test]
    async fn disabled_entries_block_new_assignments_only() {
        let f = fixture();
        let ford = f.catalog.create_brand("Ford", None).await.unwrap();
        let mut input = new_vehicle(f.company, "A1");
        input.brand_id = Some(ford.id);
        let vehicle = f.registry.create(input).await.unwrap();

        f.catalog.disable(CatalogKind::Brand, ford.id).await.unwrap();

        let patch = VehiclePatch {
            status: Some(VehicleStatus::Maintenance),
            ..Default::default()
        };
        let updated = f.registry.update(vehicle.id, patch).await.unwrap();
        assert_eq!(updated.brand_id, Some(ford.id));
        assert_eq!(updated.status, VehicleStatus::Maintenance);

        let mut other = new_vehicle(f.company, "B2");
        other.brand_id = Some(ford.id);
        assert!(matches!(
            f.registry.create(other).await,
            Err(DomainError::ReferentialIntegrity { reason: "is disabled", .. })
        ));
    }

    #[tokio::test]
    async fn update_validates_patched_fields_and_keeps_identity() {
        let f = fixture();
        let vehicle = f.registry.create(new_vehicle(f.company, "A1")).await.unwrap();

        let bad = VehiclePatch {
            mileage: Some(Some(-10)),
            ..Default::default()
        };
        assert!(f.registry.update(vehicle.id, bad).await.is_err());

        let patch = VehiclePatch {
            plate: Some("zz99".into()),
            color: Some(Some("Red".into())),
            condition: Some(VehicleCondition::Rented),
            ..Default::default()
        };
        let updated = f.registry.update(vehicle.id, patch).await.unwrap();
        assert_eq!(updated.id, vehicle.id);
        assert_eq!(updated.plate, "ZZ99");
        assert_eq!(updated.mileage, None);
        assert_eq!(updated.condition, VehicleCondition::Rented);
    }

    #[tokio::test]
    async fn update_of_missing_vehicle_is_not_found() {
        let f = fixture();
        let result = f.registry.update(Uuid::new_v4(), VehiclePatch::default()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_filters_by_company_and_status() {
        let f = fixture();
        let other_company = Uuid::new_v4();
        f.registry.create(new_vehicle(f.company, "B2")).await.unwrap();
        f.registry.create(new_vehicle(f.company, "A1")).await.unwrap();
        f.registry.create(new_vehicle(other_company, "C3")).await.unwrap();

        let filter = VehicleFilter {
            company_id: Some(f.company),
            status: None,
        };
        let plates: Vec<_> = f
            .registry
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.plate)
            .collect();
        assert_eq!(plates, vec!["A1", "B2"]);

        let stats = f.registry.fleet_stats(&filter).await.unwrap();
        assert_eq!(stats.total, 2);
        assert!((stats.active_percentage - 100.0).abs() < f64::EPSILON);
    }
}
