pub mod locks;
pub mod services;

pub use locks::KeyedLocks;
pub use services::{CatalogService, OdometerLedger, RechargeCardLedger, VehicleRegistry};
