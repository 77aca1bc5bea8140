//! Catalog module: brands, vehicle types, models

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
