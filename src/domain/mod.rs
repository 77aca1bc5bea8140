pub mod catalog;
pub mod odometer;
pub mod recharge_card;
pub mod repositories;
pub mod vehicle;

// Re-export commonly used types
pub use catalog::{Brand, CatalogEntry, CatalogKind, CatalogRecord, VehicleModel, VehicleType};
pub use odometer::{
    OdometerOrder, OdometerProjection, OdometerReading, OdometerStats, ReadingHistory,
    ReadingSource,
};
pub use recharge_card::{
    BalanceProjection, CardBalance, CardProvider, CardStats, CardStatus, MovementType,
    RechargeCard, RechargeMovement,
};
pub use repositories::RepositoryProvider;
pub use vehicle::{
    FleetStats, NewVehicle, OdometerUnit, Vehicle, VehicleCondition, VehicleFilter, VehiclePatch,
    VehicleStatus,
};

pub use crate::shared::types::errors::{DomainError, DomainResult};
