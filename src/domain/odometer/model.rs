//! Odometer readings, the per-vehicle projection and distance statistics

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Where a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingSource {
    #[default]
    Manual,
    Trip,
    Service,
}

impl ReadingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Trip => "trip",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for ReadingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadingSource {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "trip" => Ok(Self::Trip),
            "service" => Ok(Self::Service),
            other => Err(DomainError::validation(
                "source",
                format!("unknown reading source '{}'", other),
            )),
        }
    }
}

/// Which order monotonicity is validated in.
///
/// The ledger is always stored in insertion order; `at` is metadata unless
/// `Timestamp` is selected, in which case a reading is checked against its
/// neighbours on the `at` timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OdometerOrder {
    #[default]
    Insertion,
    Timestamp,
}

impl std::str::FromStr for OdometerOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "insertion" => Ok(Self::Insertion),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(DomainError::validation(
                "odometer_order",
                format!("unknown ordering policy '{}'", other),
            )),
        }
    }
}

/// One immutable entry of a vehicle's odometer ledger
#[derive(Debug, Clone, PartialEq)]
pub struct OdometerReading {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    /// 1-based position in the vehicle's ledger
    pub sequence: u64,
    pub value: i64,
    pub source: ReadingSource,
    /// When the reading was taken, as stated by the caller
    pub at: DateTime<Utc>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Derived state of one vehicle's ledger. Always rebuildable by replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdometerProjection {
    pub latest: Option<OdometerReading>,
    pub count: u64,
}

impl OdometerProjection {
    pub fn replay<'a>(readings: impl IntoIterator<Item = &'a OdometerReading>) -> Self {
        let mut projection = Self::default();
        for reading in readings {
            projection.apply(reading);
        }
        projection
    }

    pub fn apply(&mut self, reading: &OdometerReading) {
        self.count += 1;
        self.latest = Some(reading.clone());
    }

    /// Sequence number the next accepted reading must carry
    pub fn next_sequence(&self) -> u64 {
        self.count + 1
    }

    /// Insertion-order monotonicity: equal values are accepted.
    pub fn check_monotonic(&self, vehicle_id: Uuid, value: i64) -> DomainResult<()> {
        match &self.latest {
            Some(latest) if value < latest.value => Err(DomainError::MonotonicityViolation {
                vehicle_id: vehicle_id.to_string(),
                latest: latest.value,
                attempted: value,
            }),
            _ => Ok(()),
        }
    }
}

/// Timestamp-order monotonicity: `value` must not be below any reading taken
/// at or before `at`, nor above any reading taken after it.
pub fn check_timeline(
    readings: &[OdometerReading],
    vehicle_id: Uuid,
    value: i64,
    at: DateTime<Utc>,
) -> DomainResult<()> {
    let floor = readings.iter().filter(|r| r.at <= at).map(|r| r.value).max();
    if let Some(floor) = floor {
        if value < floor {
            return Err(DomainError::MonotonicityViolation {
                vehicle_id: vehicle_id.to_string(),
                latest: floor,
                attempted: value,
            });
        }
    }
    let ceiling = readings.iter().filter(|r| r.at > at).map(|r| r.value).min();
    if let Some(ceiling) = ceiling {
        if value > ceiling {
            return Err(DomainError::MonotonicityViolation {
                vehicle_id: vehicle_id.to_string(),
                latest: ceiling,
                attempted: value,
            });
        }
    }
    Ok(())
}

/// Distance statistics over a trailing window
#[derive(Debug, Clone, PartialEq)]
pub struct OdometerStats {
    pub period_days: u32,
    pub total_distance: i64,
    pub average_daily: f64,
    /// Readings whose `at` falls inside the window
    pub readings_count: usize,
}

impl OdometerStats {
    /// Window is `[as_of - period_days, as_of]`, both ends inclusive.
    ///
    /// `total_distance` runs from the first in-window reading in ledger order
    /// to the latest reading of the ledger; `readings` must be in ledger order.
    pub fn compute(readings: &[OdometerReading], period_days: u32, as_of: DateTime<Utc>) -> Self {
        let window_start = as_of - Duration::days(i64::from(period_days));
        let mut in_window = readings
            .iter()
            .filter(|r| r.at >= window_start && r.at <= as_of);

        let earliest = in_window.next();
        let readings_count = earliest.map_or(0, |_| 1 + in_window.count());

        let total_distance = match (earliest, readings.last()) {
            (Some(earliest), Some(latest)) => (latest.value - earliest.value).max(0),
            _ => 0,
        };

        let average_daily = if readings_count >= 2 && period_days > 0 {
            total_distance as f64 / f64::from(period_days)
        } else {
            0.0
        };

        Self {
            period_days,
            total_distance,
            average_daily,
            readings_count,
        }
    }
}

/// Read-only snapshot of a ledger, iterated newest first.
///
/// Iteration is lazy and can be restarted any number of times.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    readings: Arc<[OdometerReading]>,
}

impl ReadingHistory {
    pub fn new(readings: Vec<OdometerReading>) -> Self {
        Self {
            readings: readings.into(),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &OdometerReading> + ExactSizeIterator {
        self.readings.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReadingHistory {
    type Item = &'a OdometerReading;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, OdometerReading>>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn reading(sequence: u64, value: i64, at: DateTime<Utc>) -> OdometerReading {
        OdometerReading {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::nil(),
            sequence,
            value,
            source: ReadingSource::Manual,
            at,
            note: None,
            recorded_at: at,
        }
    }

    #[test]
    fn stats_use_first_reading_inside_the_window() {
        let ledger = vec![
            reading(1, 100, day(0)),
            reading(2, 150, day(10)),
            reading(3, 300, day(40)),
        ];
        let stats = OdometerStats::compute(&ledger, 30, day(40));
        assert_eq!(stats.readings_count, 2);
        assert_eq!(stats.total_distance, 150);
        assert!((stats.average_daily - 5.0).abs() < 1e-9);
    }

    #[test]
    fn single_reading_window_has_zero_average() {
        let ledger = vec![reading(1, 100, day(0)), reading(2, 400, day(40))];
        let stats = OdometerStats::compute(&ledger, 30, day(40));
        assert_eq!(stats.readings_count, 1);
        assert_eq!(stats.total_distance, 0);
        assert_eq!(stats.average_daily, 0.0);
    }

    #[test]
    fn empty_ledger_yields_zeroes() {
        let stats = OdometerStats::compute(&[], 30, day(0));
        assert_eq!(stats.total_distance, 0);
        assert_eq!(stats.readings_count, 0);
    }

    #[test]
    fn projection_replay_tracks_latest_and_count() {
        let ledger = vec![reading(1, 10, day(0)), reading(2, 10, day(1)), reading(3, 25, day(2))];
        let projection = OdometerProjection::replay(&ledger);
        assert_eq!(projection.count, 3);
        assert_eq!(projection.next_sequence(), 4);
        assert_eq!(projection.latest.as_ref().map(|r| r.value), Some(25));
        assert!(projection.check_monotonic(Uuid::nil(), 25).is_ok());
        assert!(matches!(
            projection.check_monotonic(Uuid::nil(), 24),
            Err(DomainError::MonotonicityViolation { latest: 25, attempted: 24, .. })
        ));
    }

    #[test]
    fn timeline_check_accepts_backdated_reading_between_neighbours() {
        let ledger = vec![reading(1, 100, day(0)), reading(2, 300, day(20))];
        assert!(check_timeline(&ledger, Uuid::nil(), 200, day(10)).is_ok());
        assert!(matches!(
            check_timeline(&ledger, Uuid::nil(), 50, day(10)),
            Err(DomainError::MonotonicityViolation { latest: 100, attempted: 50, .. })
        ));
        assert!(matches!(
            check_timeline(&ledger, Uuid::nil(), 350, day(10)),
            Err(DomainError::MonotonicityViolation { latest: 300, attempted: 350, .. })
        ));
    }

    #[test]
    fn history_iterates_newest_first_and_restarts() {
        let history = ReadingHistory::new(vec![reading(1, 1, day(0)), reading(2, 2, day(1))]);
        let first: Vec<i64> = history.iter().map(|r| r.value).collect();
        let second: Vec<i64> = (&history).into_iter().map(|r| r.value).collect();
        assert_eq!(first, vec![2, 1]);
        assert_eq!(first, second);
    }
}
