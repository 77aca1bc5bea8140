pub mod cards;
pub mod catalog;
pub mod health;
pub mod odometer;
pub mod vehicles;
