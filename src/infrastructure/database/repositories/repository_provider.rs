//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::catalog::{CatalogRepository, ModelRepository};
use crate::domain::odometer::OdometerRepository;
use crate::domain::recharge_card::{MovementRepository, RechargeCardRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::vehicle::VehicleRepository;
use crate::domain::{Brand, VehicleType};

use super::catalog_repository::{
    SeaOrmBrandRepository, SeaOrmModelRepository, SeaOrmVehicleTypeRepository,
};
use super::odometer_repository::SeaOrmOdometerRepository;
use super::recharge_card_repository::{SeaOrmMovementRepository, SeaOrmRechargeCardRepository};
use super::vehicle_repository::SeaOrmVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let brand = repos.brands().find_by_name(None, "Toyota").await?;
/// let log = repos.recharge_movements().find_by_card(card_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    brands: SeaOrmBrandRepository,
    vehicle_types: SeaOrmVehicleTypeRepository,
    models: SeaOrmModelRepository,
    vehicles: SeaOrmVehicleRepository,
    odometer: SeaOrmOdometerRepository,
    recharge_cards: SeaOrmRechargeCardRepository,
    recharge_movements: SeaOrmMovementRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            brands: SeaOrmBrandRepository::new(db.clone()),
            vehicle_types: SeaOrmVehicleTypeRepository::new(db.clone()),
            models: SeaOrmModelRepository::new(db.clone()),
            vehicles: SeaOrmVehicleRepository::new(db.clone()),
            odometer: SeaOrmOdometerRepository::new(db.clone()),
            recharge_cards: SeaOrmRechargeCardRepository::new(db.clone()),
            recharge_movements: SeaOrmMovementRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn brands(&self) -> &dyn CatalogRepository<Brand> {
        &self.brands
    }

    fn vehicle_types(&self) -> &dyn CatalogRepository<VehicleType> {
        &self.vehicle_types
    }

    fn models(&self) -> &dyn ModelRepository {
        &self.models
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn odometer(&self) -> &dyn OdometerRepository {
        &self.odometer
    }

    fn recharge_cards(&self) -> &dyn RechargeCardRepository {
        &self.recharge_cards
    }

    fn recharge_movements(&self) -> &dyn MovementRepository {
        &self.recharge_movements
    }
}
