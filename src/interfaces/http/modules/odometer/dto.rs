//! Odometer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{DomainError, DomainResult, OdometerProjection, OdometerReading, OdometerStats};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub sequence: u64,
    pub value: i64,
    /// manual, trip, service
    pub source: String,
    pub at: DateTime<Utc>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<OdometerReading> for ReadingDto {
    fn from(r: OdometerReading) -> Self {
        Self {
            id: r.id,
            vehicle_id: r.vehicle_id,
            sequence: r.sequence,
            value: r.value,
            source: r.source.to_string(),
            at: r.at,
            note: r.note,
            recorded_at: r.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddReadingRequest {
    /// Non-negative integer
    #[schema(value_type = i64)]
    pub value: serde_json::Number,
    /// manual (default), trip, service
    pub source: Option<String>,
    /// When the reading was taken. Default: now
    pub at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Largest integer an `f64` holds exactly
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl AddReadingRequest {
    /// Reading value as an exact integer. Integral floats such as `120.0` are
    /// accepted while they are exactly representable.
    pub fn reading_value(&self) -> DomainResult<i64> {
        let raw = &self.value;
        if let Some(value) = raw.as_i64() {
            if value < 0 {
                return Err(DomainError::validation("value", format!("{} is negative", raw)));
            }
            return Ok(value);
        }
        if raw.is_u64() {
            return Err(DomainError::validation("value", format!("{} is out of range", raw)));
        }
        match raw.as_f64() {
            Some(f) if f.fract() != 0.0 => Err(DomainError::validation(
                "value",
                format!("{} is not an integer", raw),
            )),
            Some(f) if f < 0.0 => Err(DomainError::validation("value", format!("{} is negative", raw))),
            Some(f) if f <= MAX_EXACT_FLOAT => Ok(f as i64),
            _ => Err(DomainError::validation("value", format!("{} is out of range", raw))),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Trailing window in days. Default: configured period
    pub period_days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OdometerStatsDto {
    pub period_days: u32,
    pub total_distance: i64,
    pub average_daily: f64,
    pub readings_count: usize,
}

impl From<OdometerStats> for OdometerStatsDto {
    fn from(s: OdometerStats) -> Self {
        Self {
            period_days: s.period_days,
            total_distance: s.total_distance,
            average_daily: s.average_daily,
            readings_count: s.readings_count,
        }
    }
}

/// Result of replaying a vehicle's ledger
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectionDto {
    pub count: u64,
    pub latest: Option<ReadingDto>,
}

impl From<OdometerProjection> for ProjectionDto {
    fn from(p: OdometerProjection) -> Self {
        Self {
            count: p.count,
            latest: p.latest.map(Into::into),
        }
    }
}
