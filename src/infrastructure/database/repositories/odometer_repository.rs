//! SeaORM implementation of OdometerRepository
//!
//! Appends count the vehicle's rows and insert inside one transaction; the
//! unique `(vehicle_id, sequence)` index catches writers that slip past the
//! count.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::{db_err, is_unique_violation, parse_column};
use crate::domain::odometer::OdometerRepository;
use crate::domain::{DomainError, DomainResult, OdometerReading};
use crate::infrastructure::database::entities::odometer_reading;

fn entity_to_domain(r: odometer_reading::Model) -> DomainResult<OdometerReading> {
    Ok(OdometerReading {
        id: r.id,
        vehicle_id: r.vehicle_id,
        sequence: r.sequence as u64,
        value: r.value,
        source: parse_column("source", &r.source)?,
        at: r.at,
        note: r.note,
        recorded_at: r.recorded_at,
    })
}

fn conflict(vehicle_id: Uuid) -> DomainError {
    DomainError::Conflict {
        entity: "OdometerReading",
        key: vehicle_id.to_string(),
    }
}

pub struct SeaOrmOdometerRepository {
    db: DatabaseConnection,
}

impl SeaOrmOdometerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OdometerRepository for SeaOrmOdometerRepository {
    async fn append(&self, reading: OdometerReading) -> DomainResult<OdometerReading> {
        let vehicle_id = reading.vehicle_id;
        let txn = self.db.begin().await.map_err(db_err)?;

        let count = odometer_reading::Entity::find()
            .filter(odometer_reading::Column::VehicleId.eq(vehicle_id))
            .count(&txn)
            .await
            .map_err(db_err)?;
        if reading.sequence != count + 1 {
            debug!(%vehicle_id, expected = reading.sequence, count, "Stale odometer sequence");
            return Err(conflict(vehicle_id));
        }

        let model = odometer_reading::ActiveModel {
            id: Set(reading.id),
            vehicle_id: Set(vehicle_id),
            sequence: Set(reading.sequence as i64),
            value: Set(reading.value),
            source: Set(reading.source.as_str().to_string()),
            at: Set(reading.at),
            note: Set(reading.note.clone()),
            recorded_at: Set(reading.recorded_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict(vehicle_id)
            } else {
                db_err(e)
            }
        })?;

        txn.commit().await.map_err(db_err)?;
        entity_to_domain(model)
    }

    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<Vec<OdometerReading>> {
        let models = odometer_reading::Entity::find()
            .filter(odometer_reading::Column::VehicleId.eq(vehicle_id))
            .order_by_asc(odometer_reading::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> DomainResult<u64> {
        odometer_reading::Entity::find()
            .filter(odometer_reading::Column::VehicleId.eq(vehicle_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
