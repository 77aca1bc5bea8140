//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives services access to every per-aggregate record
//! store. Stores perform no domain validation; services check every
//! invariant before calling `create`/`update`/`append`.

use super::catalog::{Brand, CatalogRepository, ModelRepository, VehicleType};
use super::odometer::OdometerRepository;
use super::recharge_card::{MovementRepository, RechargeCardRepository};
use super::vehicle::VehicleRepository;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let brand = repos.brands().find_by_name(None, "toyota").await?;
///     let ledger = repos.odometer().find_by_vehicle(vehicle_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn brands(&self) -> &dyn CatalogRepository<Brand>;
    fn vehicle_types(&self) -> &dyn CatalogRepository<VehicleType>;
    fn models(&self) -> &dyn ModelRepository;
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn odometer(&self) -> &dyn OdometerRepository;
    fn recharge_cards(&self) -> &dyn RechargeCardRepository;
    fn recharge_movements(&self) -> &dyn MovementRepository;
}
