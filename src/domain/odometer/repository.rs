//! Odometer ledger repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::OdometerReading;
use crate::domain::DomainResult;

#[async_trait]
pub trait OdometerRepository: Send + Sync {
    /// Append a reading to its vehicle's ledger.
    ///
    /// `reading.sequence` is the writer's expectation of the ledger length
    /// plus one; a store that already holds that many readings or more must
    /// reject the append with `DomainError::Conflict` and write nothing.
    async fn append(&self, reading: OdometerReading) -> DomainResult<OdometerReading>;

    /// Full ledger of a vehicle in append order
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<OdometerReading>>;

    /// Number of readings in a vehicle's ledger
    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<u64>;
}
