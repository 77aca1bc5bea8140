//! Catalog repository interfaces

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{CatalogRecord, VehicleModel};
use crate::domain::DomainResult;

/// Record store for one catalog kind.
///
/// `create` and `update` must enforce name uniqueness inside the entry's
/// scope and answer a collision with `DomainError::AlreadyExists`; that
/// signal is what lets two racing find-or-create calls converge.
#[async_trait]
pub trait CatalogRepository<E: CatalogRecord>: Send + Sync {
    /// Persist a new entry
    async fn create(&self, entry: E) -> DomainResult<E>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<E>>;

    /// Case-insensitive lookup within a name scope
    async fn find_by_name(&self, scope: Option<Uuid>, name: &str) -> DomainResult<Option<E>>;

    /// All entries, enabled or not, ordered by name
    async fn find_all(&self) -> DomainResult<Vec<E>>;

    /// Replace an existing entry
    async fn update(&self, entry: E) -> DomainResult<E>;
}

/// Models additionally keep a brand index
#[async_trait]
pub trait ModelRepository: CatalogRepository<VehicleModel> {
    async fn find_by_brand(&self, brand_id: Uuid) -> DomainResult<Vec<VehicleModel>>;
}
