//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_brands;
mod m20250301_000002_create_vehicle_types;
mod m20250301_000003_create_vehicle_models;
mod m20250301_000004_create_vehicles;
mod m20250301_000005_create_odometer_readings;
mod m20250301_000006_create_recharge_cards;
mod m20250301_000007_create_recharge_movements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_brands::Migration),
            Box::new(m20250301_000002_create_vehicle_types::Migration),
            Box::new(m20250301_000003_create_vehicle_models::Migration),
            Box::new(m20250301_000004_create_vehicles::Migration),
            Box::new(m20250301_000005_create_odometer_readings::Migration),
            Box::new(m20250301_000006_create_recharge_cards::Migration),
            Box::new(m20250301_000007_create_recharge_movements::Migration),
        ]
    }
}
