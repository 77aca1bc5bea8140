//! Vehicle aggregate

pub mod model;
pub mod repository;

pub use model::{
    FleetStats, NewVehicle, OdometerUnit, Vehicle, VehicleCondition, VehicleFilter, VehiclePatch,
    VehicleStatus,
};
pub use repository::VehicleRepository;
