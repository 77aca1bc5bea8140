//! Catalog aggregate
//!
//! Brands, vehicle types and models, plus their repository interfaces.

pub mod model;
pub mod repository;

pub use model::{Brand, CatalogEntry, CatalogKind, CatalogRecord, VehicleModel, VehicleType};
pub use repository::{CatalogRepository, ModelRepository};
