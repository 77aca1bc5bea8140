//! In-memory repository provider for development and testing
//!
//! Uniqueness indexes and ledger sequence checks run under DashMap entry
//! locks, so they hold against concurrent callers just like the unique
//! indexes of the database back-end.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::catalog::{CatalogRepository, ModelRepository};
use crate::domain::odometer::OdometerRepository;
use crate::domain::recharge_card::{MovementRepository, RechargeCardRepository};
use crate::domain::vehicle::VehicleRepository;
use crate::domain::{
    Brand, CatalogRecord, DomainError, DomainResult, OdometerReading, RechargeCard,
    RechargeMovement, RepositoryProvider, Vehicle, VehicleFilter, VehicleModel, VehicleType,
};
use crate::shared::validations::name_key;

/// Every repository backed by process memory
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    brands: MemoryCatalog<Brand>,
    vehicle_types: MemoryCatalog<VehicleType>,
    models: MemoryCatalog<VehicleModel>,
    vehicles: MemoryVehicles,
    odometer: MemoryOdometer,
    cards: MemoryCards,
    movements: MemoryMovements,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn brands(&self) -> &dyn CatalogRepository<Brand> {
        &self.brands
    }

    fn vehicle_types(&self) -> &dyn CatalogRepository<VehicleType> {
        &self.vehicle_types
    }

    fn models(&self) -> &dyn ModelRepository {
        &self.models
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn odometer(&self) -> &dyn OdometerRepository {
        &self.odometer
    }

    fn recharge_cards(&self) -> &dyn RechargeCardRepository {
        &self.cards
    }

    fn recharge_movements(&self) -> &dyn MovementRepository {
        &self.movements
    }
}

// ── Catalog ─────────────────────────────────────────────────────

struct MemoryCatalog<E> {
    entries: DashMap<Uuid, E>,
    /// (scope, lower-cased name) -> id
    names: DashMap<(Option<Uuid>, String), Uuid>,
}

impl<E> Default for MemoryCatalog<E> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            names: DashMap::new(),
        }
    }
}

impl<E: CatalogRecord> MemoryCatalog<E> {
    fn duplicate(entry: &E) -> DomainError {
        DomainError::AlreadyExists {
            entity: E::KIND.entity_name(),
            field: "name",
            value: entry.name().to_string(),
        }
    }

    fn sorted(mut entries: Vec<E>) -> Vec<E> {
        entries.sort_by_key(|e| name_key(e.name()));
        entries
    }
}

#[async_trait]
impl<E: CatalogRecord> CatalogRepository<E> for MemoryCatalog<E> {
    async fn create(&self, entry: E) -> DomainResult<E> {
        match self.names.entry(entry.uniqueness_key()) {
            Entry::Occupied(_) => return Err(Self::duplicate(&entry)),
            Entry::Vacant(slot) => {
                self.entries.insert(entry.id(), entry.clone());
                slot.insert(entry.id());
            }
        }
        Ok(entry)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<E>> {
        Ok(self.entries.get(&id).map(|e| e.clone()))
    }

    async fn find_by_name(&self, scope: Option<Uuid>, name: &str) -> DomainResult<Option<E>> {
        let id = match self.names.get(&(scope, name_key(name))) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn find_all(&self) -> DomainResult<Vec<E>> {
        Ok(Self::sorted(
            self.entries.iter().map(|e| e.value().clone()).collect(),
        ))
    }

    async fn update(&self, entry: E) -> DomainResult<E> {
        let id = entry.id();
        let previous_key = self
            .entries
            .get(&id)
            .map(|current| current.uniqueness_key())
            .ok_or_else(|| DomainError::not_found(E::KIND.entity_name(), id))?;

        let key = entry.uniqueness_key();
        if key != previous_key {
            match self.names.entry(key) {
                Entry::Occupied(owner) if *owner.get() != id => {
                    return Err(Self::duplicate(&entry));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.names.remove_if(&previous_key, |_, owner| *owner == id);
        }
        self.entries.insert(id, entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl ModelRepository for MemoryCatalog<VehicleModel> {
    async fn find_by_brand(&self, brand_id: Uuid) -> DomainResult<Vec<VehicleModel>> {
        Ok(Self::sorted(
            self.entries
                .iter()
                .filter(|m| m.brand_id == brand_id)
                .map(|m| m.value().clone())
                .collect(),
        ))
    }
}

// ── Vehicles ────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryVehicles {
    vehicles: DashMap<Uuid, Vehicle>,
}

#[async_trait]
impl VehicleRepository for MemoryVehicles {
    async fn create(&self, vehicle: Vehicle) -> DomainResult<Vehicle> {
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        Ok(self.vehicles.get(&id).map(|v| v.clone()))
    }

    async fn update(&self, vehicle: Vehicle) -> DomainResult<Vehicle> {
        match self.vehicles.get_mut(&vehicle.id) {
            Some(mut current) => {
                *current = vehicle.clone();
                Ok(vehicle)
            }
            None => Err(DomainError::not_found("Vehicle", vehicle.id)),
        }
    }

    async fn query(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .iter()
            .filter(|v| filter.matches(v))
            .map(|v| v.value().clone())
            .collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(vehicles)
    }
}

// ── Ledgers ─────────────────────────────────────────────────────

fn check_sequence(entity: &'static str, key: Uuid, len: usize, sequence: u64) -> DomainResult<()> {
    if sequence != len as u64 + 1 {
        return Err(DomainError::Conflict {
            entity,
            key: key.to_string(),
        });
    }
    Ok(())
}

#[derive(Default)]
struct MemoryOdometer {
    ledgers: DashMap<Uuid, Vec<OdometerReading>>,
}

#[async_trait]
impl OdometerRepository for MemoryOdometer {
    async fn append(&self, reading: OdometerReading) -> DomainResult<OdometerReading> {
        let mut ledger = self.ledgers.entry(reading.vehicle_id).or_default();
        check_sequence("OdometerReading", reading.vehicle_id, ledger.len(), reading.sequence)?;
        ledger.push(reading.clone());
        Ok(reading)
    }

    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<OdometerReading>> {
        Ok(self
            .ledgers
            .get(&vehicle_id)
            .map(|l| l.clone())
            .unwrap_or_default())
    }

    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<u64> {
        Ok(self.ledgers.get(&vehicle_id).map_or(0, |l| l.len() as u64))
    }
}

#[derive(Default)]
struct MemoryCards {
    cards: DashMap<Uuid, RechargeCard>,
    /// (company, lower-cased code) -> id
    codes: DashMap<(Uuid, String), Uuid>,
}

#[async_trait]
impl RechargeCardRepository for MemoryCards {
    async fn create(&self, card: RechargeCard) -> DomainResult<RechargeCard> {
        match self.codes.entry((card.company_id, name_key(&card.code))) {
            Entry::Occupied(_) => Err(DomainError::AlreadyExists {
                entity: "RechargeCard",
                field: "code",
                value: card.code,
            }),
            Entry::Vacant(slot) => {
                self.cards.insert(card.id, card.clone());
                slot.insert(card.id);
                Ok(card)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RechargeCard>> {
        Ok(self.cards.get(&id).map(|c| c.clone()))
    }

    async fn find_by_code(&self, company_id: Uuid, code: &str) -> DomainResult<Option<RechargeCard>> {
        let id = match self.codes.get(&(company_id, name_key(code))) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn find_by_company(&self, company_id: Option<Uuid>) -> DomainResult<Vec<RechargeCard>> {
        let mut cards: Vec<RechargeCard> = self
            .cards
            .iter()
            .filter(|c| company_id.map_or(true, |id| c.company_id == id))
            .map(|c| c.value().clone())
            .collect();
        cards.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(cards)
    }

    /// Codes are immutable; only the remaining fields are replaced
    async fn update(&self, card: RechargeCard) -> DomainResult<RechargeCard> {
        match self.cards.get_mut(&card.id) {
            Some(mut current) => {
                current.provider = card.provider;
                current.status = card.status;
                current.allow_negative = card.allow_negative;
                current.updated_at = card.updated_at;
                Ok(current.clone())
            }
            None => Err(DomainError::not_found("RechargeCard", card.id)),
        }
    }
}

#[derive(Default)]
struct MemoryMovements {
    ledgers: DashMap<Uuid, Vec<RechargeMovement>>,
}

#[async_trait]
impl MovementRepository for MemoryMovements {
    async fn append(&self, movement: RechargeMovement) -> DomainResult<RechargeMovement> {
        let mut ledger = self.ledgers.entry(movement.card_id).or_default();
        check_sequence("RechargeMovement", movement.card_id, ledger.len(), movement.sequence)?;
        ledger.push(movement.clone());
        Ok(movement)
    }

    async fn find_by_card(&self, card_id: Uuid) -> DomainResult<Vec<RechargeMovement>> {
        Ok(self
            .ledgers
            .get(&card_id)
            .map(|l| l.clone())
            .unwrap_or_default())
    }

    async fn count_by_card(&self, card_id: Uuid) -> DomainResult<u64> {
        Ok(self.ledgers.get(&card_id).map_or(0, |l| l.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::ReadingSource;

    fn reading(vehicle_id: Uuid, sequence: u64, value: i64) -> OdometerReading {
        OdometerReading {
            id: Uuid::new_v4(),
            vehicle_id,
            sequence,
            value,
            source: ReadingSource::Manual,
            at: Utc::now(),
            note: None,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn catalog_names_are_unique_per_scope() {
        let repos = InMemoryRepositoryProvider::new();
        let brand = Brand::new("Toyota", None);
        repos.brands().create(brand.clone()).await.unwrap();
        assert!(matches!(
            repos.brands().create(Brand::new("toyota", None)).await,
            Err(DomainError::AlreadyExists { .. })
        ));

        let found = repos.brands().find_by_name(None, " TOYOTA").await.unwrap();
        assert_eq!(found.map(|b| b.id), Some(brand.id));

        let other_brand = Uuid::new_v4();
        repos.models().create(VehicleModel::new("Corolla", brand.id)).await.unwrap();
        repos.models().create(VehicleModel::new("Corolla", other_brand)).await.unwrap();
        assert_eq!(repos.models().find_by_brand(brand.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_moves_the_name_index() {
        let repos = InMemoryRepositoryProvider::new();
        let mut brand = repos.brands().create(Brand::new("Seat", None)).await.unwrap();
        brand.rename("Cupra".into());
        repos.brands().update(brand.clone()).await.unwrap();

        assert!(repos.brands().find_by_name(None, "seat").await.unwrap().is_none());
        assert!(repos.brands().find_by_name(None, "cupra").await.unwrap().is_some());
        repos.brands().create(Brand::new("Seat", None)).await.unwrap();
    }

    #[tokio::test]
    async fn append_rejects_stale_sequence() {
        let repos = InMemoryRepositoryProvider::new();
        let vehicle = Uuid::new_v4();
        repos.odometer().append(reading(vehicle, 1, 10)).await.unwrap();

        let stale = repos.odometer().append(reading(vehicle, 1, 20)).await;
        assert!(matches!(stale, Err(DomainError::Conflict { .. })));

        repos.odometer().append(reading(vehicle, 2, 20)).await.unwrap();
        let values: Vec<i64> = repos
            .odometer()
            .find_by_vehicle(vehicle)
            .await
            .unwrap()
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![10, 20]);
    }
}
