//! Vehicle repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Vehicle, VehicleFilter};
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Persist a validated vehicle
    async fn create(&self, vehicle: Vehicle) -> DomainResult<Vehicle>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>>;

    /// Replace an existing vehicle
    async fn update(&self, vehicle: Vehicle) -> DomainResult<Vehicle>;

    /// Vehicles matching `filter`, ordered by plate
    async fn query(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>>;
}
