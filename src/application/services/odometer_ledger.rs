//! Odometer ledger
//!
//! Per-vehicle append-only reading log. Writers for one vehicle are
//! serialised by [`KeyedLocks`] and every append carries the sequence number
//! the writer expects, so a writer in another process shows up as
//! `Conflict` instead of a silent monotonicity breach.
//!
//! The latest-reading projection is cached per vehicle. Only writers holding
//! the vehicle's lock fill or advance the cache; readers use it when present
//! and otherwise replay the log without touching the cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::KeyedLocks;
use crate::config::FleetSettings;
use crate::domain::odometer::check_timeline;
use crate::domain::{
    DomainError, DomainResult, OdometerOrder, OdometerProjection, OdometerReading, OdometerStats,
    ReadingHistory, ReadingSource, RepositoryProvider,
};
use crate::shared::validations::optional_text;
use crate::shared::with_deadline;

pub struct OdometerLedger {
    repos: Arc<dyn RepositoryProvider>,
    settings: FleetSettings,
    locks: KeyedLocks,
    cache: DashMap<Uuid, OdometerProjection>,
}

impl OdometerLedger {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: FleetSettings) -> Self {
        Self {
            repos,
            settings,
            locks: KeyedLocks::new(),
            cache: DashMap::new(),
        }
    }

    /// Append a reading after checking it against the vehicle's ledger.
    pub async fn add_reading(
        &self,
        vehicle_id: Uuid,
        value: i64,
        source: ReadingSource,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> DomainResult<OdometerReading> {
        if value < 0 {
            return Err(DomainError::validation("value", format!("{} is negative", value)));
        }

        let _guard = self.locks.acquire(vehicle_id).await;

        self.store("vehicles.find_by_id", self.repos.vehicles().find_by_id(vehicle_id))
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))?;

        let mut projection = match self.settings.odometer_order {
            OdometerOrder::Insertion => {
                let projection = self.writer_projection(vehicle_id).await?;
                projection.check_monotonic(vehicle_id, value)
                    .map(|_| projection)
            }
            OdometerOrder::Timestamp => {
                let readings = self.load(vehicle_id).await?;
                let projection = OdometerProjection::replay(&readings);
                self.cache.insert(vehicle_id, projection.clone());
                check_timeline(&readings, vehicle_id, value, at).map(|_| projection)
            }
        }
        .inspect_err(|e| warn!(%vehicle_id, value, error = %e, "Odometer reading rejected"))?;

        let reading = OdometerReading {
            id: Uuid::new_v4(),
            vehicle_id,
            sequence: projection.next_sequence(),
            value,
            source,
            at,
            note: optional_text(note),
            recorded_at: Utc::now(),
        };

        match self
            .store("odometer.append", self.repos.odometer().append(reading))
            .await
        {
            Ok(stored) => {
                projection.apply(&stored);
                self.cache.insert(vehicle_id, projection);
                info!(
                    %vehicle_id,
                    value = stored.value,
                    sequence = stored.sequence,
                    source = %stored.source,
                    "Odometer reading recorded"
                );
                Ok(stored)
            }
            Err(e) => {
                if e.is_retryable() {
                    self.cache.remove(&vehicle_id);
                }
                warn!(%vehicle_id, error = %e, "Odometer append failed");
                Err(e)
            }
        }
    }

    /// Most recent reading in ledger order. The cached projection is served
    /// only while it covers every stored reading.
    pub async fn latest(&self, vehicle_id: Uuid) -> DomainResult<Option<OdometerReading>> {
        let cached = self.cache.get(&vehicle_id).map(|c| c.clone());
        if let Some(cached) = cached {
            let stored = self
                .store(
                    "odometer.count_by_vehicle",
                    self.repos.odometer().count_by_vehicle(vehicle_id),
                )
                .await?;
            if stored == cached.count {
                return Ok(cached.latest);
            }
            debug!(%vehicle_id, cached = cached.count, stored, "Cached odometer is behind the log");
            self.cache.remove_if(&vehicle_id, |_, p| p.count == cached.count);
        }
        Ok(self.load(vehicle_id).await?.pop())
    }

    /// Snapshot of the ledger, iterated newest first
    pub async fn history(&self, vehicle_id: Uuid) -> DomainResult<ReadingHistory> {
        Ok(ReadingHistory::new(self.load(vehicle_id).await?))
    }

    /// Statistics over the trailing `period_days` (configured default when
    /// `None`) ending now
    pub async fn compute_stats(
        &self,
        vehicle_id: Uuid,
        period_days: Option<u32>,
    ) -> DomainResult<OdometerStats> {
        self.compute_stats_at(vehicle_id, period_days, Utc::now()).await
    }

    pub async fn compute_stats_at(
        &self,
        vehicle_id: Uuid,
        period_days: Option<u32>,
        as_of: DateTime<Utc>,
    ) -> DomainResult<OdometerStats> {
        let period_days = period_days.unwrap_or(self.settings.stats_period_days);
        if period_days == 0 {
            return Err(DomainError::validation("period_days", "must be positive"));
        }
        let readings = self.load(vehicle_id).await?;
        Ok(OdometerStats::compute(&readings, period_days, as_of))
    }

    /// Replace the cached projection with a full replay of the log
    pub async fn rebuild(&self, vehicle_id: Uuid) -> DomainResult<OdometerProjection> {
        let _guard = self.locks.acquire(vehicle_id).await;
        let readings = self.load(vehicle_id).await?;
        let projection = OdometerProjection::replay(&readings);
        self.cache.insert(vehicle_id, projection.clone());
        debug!(%vehicle_id, count = projection.count, "Odometer projection rebuilt");
        Ok(projection)
    }

    /// Caller must hold the vehicle's lock
    async fn writer_projection(&self, vehicle_id: Uuid) -> DomainResult<OdometerProjection> {
        if let Some(cached) = self.cache.get(&vehicle_id) {
            return Ok(cached.clone());
        }
        let readings = self.load(vehicle_id).await?;
        let projection = OdometerProjection::replay(&readings);
        debug!(%vehicle_id, count = projection.count, "Odometer projection replayed");
        self.cache.insert(vehicle_id, projection.clone());
        Ok(projection)
    }

    async fn load(&self, vehicle_id: Uuid) -> DomainResult<Vec<OdometerReading>> {
        self.store("odometer.find_by_vehicle", self.repos.odometer().find_by_vehicle(vehicle_id))
            .await
    }

    async fn store<T>(
        &self,
        operation: &'static str,
        call: impl std::future::Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        with_deadline(self.settings.store_timeout, operation, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::application::VehicleRegistry;
    use crate::domain::NewVehicle;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    async fn setup(order: OdometerOrder) -> (OdometerLedger, Uuid) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let settings = FleetSettings {
            odometer_order: order,
            ..FleetSettings::default()
        };
        let registry = VehicleRegistry::new(repos.clone(), settings.clone());
        let vehicle = registry
            .create(NewVehicle {
                company_id: Some(Uuid::new_v4()),
                plate: "1234ABC".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        (OdometerLedger::new(repos, settings), vehicle.id)
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::days(n)
    }

    #[tokio::test]
    async fn readings_never_decrease() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        ledger.add_reading(vehicle, 100, ReadingSource::Manual, day(0), None).await.unwrap();

        let err = ledger
            .add_reading(vehicle, 90, ReadingSource::Manual, day(1), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::MonotonicityViolation {
                vehicle_id: vehicle.to_string(),
                latest: 100,
                attempted: 90,
            }
        );

        let equal = ledger
            .add_reading(vehicle, 100, ReadingSource::Trip, day(2), Some("same".into()))
            .await
            .unwrap();
        assert_eq!(equal.sequence, 2);
        assert_eq!(ledger.latest(vehicle).await.unwrap().unwrap().id, equal.id);
    }

    #[tokio::test]
    async fn negative_values_and_unknown_vehicles_are_rejected() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        assert!(matches!(
            ledger.add_reading(vehicle, -1, ReadingSource::Manual, day(0), None).await,
            Err(DomainError::Validation { field: "value", .. })
        ));
        assert!(matches!(
            ledger.add_reading(Uuid::new_v4(), 10, ReadingSource::Manual, day(0), None).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(ledger.latest(vehicle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn backdated_readings_follow_insertion_order_by_default() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        ledger.add_reading(vehicle, 500, ReadingSource::Manual, day(10), None).await.unwrap();
        // `at` is metadata only: an earlier timestamp with a higher value is fine
        ledger.add_reading(vehicle, 600, ReadingSource::Manual, day(1), None).await.unwrap();
        assert_eq!(ledger.latest(vehicle).await.unwrap().unwrap().value, 600);
    }

    #[tokio::test]
    async fn timestamp_policy_checks_both_neighbours() {
        let (ledger, vehicle) = setup(OdometerOrder::Timestamp).await;
        ledger.add_reading(vehicle, 100, ReadingSource::Manual, day(0), None).await.unwrap();
        ledger.add_reading(vehicle, 300, ReadingSource::Manual, day(20), None).await.unwrap();

        ledger.add_reading(vehicle, 200, ReadingSource::Service, day(10), None).await.unwrap();
        assert!(matches!(
            ledger.add_reading(vehicle, 350, ReadingSource::Manual, day(15), None).await,
            Err(DomainError::MonotonicityViolation { latest: 300, attempted: 350, .. })
        ));
        assert!(matches!(
            ledger.add_reading(vehicle, 150, ReadingSource::Manual, day(12), None).await,
            Err(DomainError::MonotonicityViolation { latest: 200, .. })
        ));
        assert_eq!(ledger.history(vehicle).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_restartable() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        for (i, value) in [10, 20, 30].into_iter().enumerate() {
            ledger
                .add_reading(vehicle, value, ReadingSource::Trip, day(i as i64), None)
                .await
                .unwrap();
        }
        let history = ledger.history(vehicle).await.unwrap();
        let first: Vec<i64> = history.iter().map(|r| r.value).collect();
        let second: Vec<i64> = (&history).into_iter().map(|r| r.value).collect();
        assert_eq!(first, vec![30, 20, 10]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stats_use_the_trailing_window() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        ledger.add_reading(vehicle, 100, ReadingSource::Manual, day(0), None).await.unwrap();
        ledger.add_reading(vehicle, 150, ReadingSource::Manual, day(10), None).await.unwrap();
        ledger.add_reading(vehicle, 300, ReadingSource::Manual, day(40), None).await.unwrap();

        let stats = ledger.compute_stats_at(vehicle, Some(30), day(40)).await.unwrap();
        assert_eq!(stats.readings_count, 2);
        assert_eq!(stats.total_distance, 150);
        assert!((stats.average_daily - 5.0).abs() < f64::EPSILON);

        assert!(matches!(
            ledger.compute_stats_at(vehicle, Some(0), day(40)).await,
            Err(DomainError::Validation { field: "period_days", .. })
        ));
    }

    #[tokio::test]
    async fn latest_reflects_readings_from_another_ledger() {
        let (first, vehicle) = setup(OdometerOrder::Insertion).await;
        let second = OdometerLedger::new(first.repos.clone(), first.settings.clone());

        first.add_reading(vehicle, 100, ReadingSource::Manual, day(0), None).await.unwrap();
        second.add_reading(vehicle, 250, ReadingSource::Trip, day(1), None).await.unwrap();

        assert_eq!(first.latest(vehicle).await.unwrap().unwrap().value, 250);
        assert!(matches!(
            first.add_reading(vehicle, 200, ReadingSource::Manual, day(2), None).await,
            Err(DomainError::MonotonicityViolation { latest: 250, attempted: 200, .. })
        ));
        let next = first
            .add_reading(vehicle, 260, ReadingSource::Manual, day(2), None)
            .await
            .unwrap();
        assert_eq!(next.sequence, 3);
        assert_eq!(second.latest(vehicle).await.unwrap().unwrap().id, next.id);
    }

    #[tokio::test]
    async fn rebuild_matches_incremental_projection() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        for value in [5, 15, 15, 40] {
            ledger.add_reading(vehicle, value, ReadingSource::Trip, day(1), None).await.unwrap();
        }
        let cached = ledger.cache.get(&vehicle).map(|p| p.clone()).unwrap();
        let rebuilt = ledger.rebuild(vehicle).await.unwrap();
        assert_eq!(cached, rebuilt);
        assert_eq!(rebuilt.count, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_keep_the_ledger_monotonic() {
        let (ledger, vehicle) = setup(OdometerOrder::Insertion).await;
        let ledger = Arc::new(ledger);
        let mut tasks = Vec::new();
        for value in (1..=20).rev() {
            let ledger = ledger.clone();
            tasks.push(tokio::spawn(async move {
                ledger
                    .add_reading(vehicle, value * 10, ReadingSource::Trip, Utc::now(), None)
                    .await
            }));
        }
        for task in tasks {
            let _ = task.await.unwrap();
        }

        let history = ledger.history(vehicle).await.unwrap();
        let values: Vec<i64> = history.iter().rev().map(|r| r.value).collect();
        assert!(!values.is_empty());
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        let sequences: Vec<u64> = history.iter().rev().map(|r| r.sequence).collect();
        assert_eq!(sequences, (1..=values.len() as u64).collect::<Vec<_>>());
    }
}
