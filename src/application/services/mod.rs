//! Application services
//!
//! Each service owns one slice of the fleet core and enforces its invariants
//! before anything reaches the record store.

mod catalog;
mod odometer_ledger;
mod recharge_ledger;
mod vehicle_registry;

pub use catalog::CatalogService;
pub use odometer_ledger::OdometerLedger;
pub use recharge_ledger::RechargeCardLedger;
pub use vehicle_registry::VehicleRegistry;

use std::time::Duration;

use uuid::Uuid;

use crate::config::FleetSettings;
use crate::domain::catalog::CatalogRepository;
use crate::domain::{CatalogRecord, DomainError, DomainResult};
use crate::shared::with_deadline;

/// Load a catalog entry that is about to be referenced.
///
/// A missing entry is a referential-integrity failure rather than
/// `NotFound`. With `must_be_enabled`, a disabled entry fails the same way.
pub(crate) async fn resolve_reference<E, R>(
    repo: &R,
    id: Uuid,
    must_be_enabled: bool,
    timeout: Duration,
) -> DomainResult<E>
where
    E: CatalogRecord,
    R: CatalogRepository<E> + ?Sized,
{
    let entity = E::KIND.entity_name();
    let entry = with_deadline(timeout, "catalog.find_by_id", repo.find_by_id(id))
        .await?
        .ok_or_else(|| DomainError::ReferentialIntegrity {
            entity,
            id: id.to_string(),
            reason: "does not exist",
        })?;
    if must_be_enabled && !entry.is_enabled() {
        return Err(DomainError::ReferentialIntegrity {
            entity,
            id: id.to_string(),
            reason: "is disabled",
        });
    }
    Ok(entry)
}

pub(crate) async fn require_enabled<E, R>(
    repo: &R,
    id: Uuid,
    settings: &FleetSettings,
) -> DomainResult<E>
where
    E: CatalogRecord,
    R: CatalogRepository<E> + ?Sized,
{
    resolve_reference(repo, id, true, settings.store_timeout).await
}

/// Years must fall inside the configured window, both ends included
pub(crate) fn validate_year(settings: &FleetSettings, year: i32) -> DomainResult<()> {
    let (min, max) = settings.year_window();
    if year < min || year > max {
        return Err(DomainError::validation(
            "year",
            format!("{} is outside {}..={}", year, min, max),
        ));
    }
    Ok(())
}
