//! Database entities module

pub mod brand;
pub mod odometer_reading;
pub mod recharge_card;
pub mod recharge_movement;
pub mod vehicle;
pub mod vehicle_model;
pub mod vehicle_type;

pub use brand::Entity as Brand;
pub use odometer_reading::Entity as OdometerReading;
pub use recharge_card::Entity as RechargeCard;
pub use recharge_movement::Entity as RechargeMovement;
pub use vehicle::Entity as Vehicle;
pub use vehicle_model::Entity as VehicleModel;
pub use vehicle_type::Entity as VehicleType;
