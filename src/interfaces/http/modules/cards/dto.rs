//! Recharge card DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{CardBalance, CardStats, RechargeCard, RechargeMovement};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    /// parkia, rfid, other
    pub provider: String,
    /// active, blocked, lost
    pub status: String,
    pub allow_negative: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RechargeCard> for CardDto {
    fn from(c: RechargeCard) -> Self {
        Self {
            id: c.id,
            company_id: c.company_id,
            code: c.code,
            provider: c.provider.to_string(),
            status: c.status.to_string(),
            allow_negative: c.allow_negative,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovementDto {
    pub id: Uuid,
    pub card_id: Uuid,
    pub sequence: u64,
    /// Always positive
    pub amount: Decimal,
    /// credit or debit
    pub movement_type: String,
    pub at: DateTime<Utc>,
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<RechargeMovement> for MovementDto {
    fn from(m: RechargeMovement) -> Self {
        Self {
            id: m.id,
            card_id: m.card_id,
            sequence: m.sequence,
            amount: m.amount,
            movement_type: m.movement_type.to_string(),
            at: m.at,
            reference: m.reference,
            recorded_at: m.recorded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceDto {
    pub card_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub last_movement: Option<MovementDto>,
    pub total_movements: u64,
}

impl From<CardBalance> for BalanceDto {
    fn from(b: CardBalance) -> Self {
        Self {
            card_id: b.card_id,
            balance: b.balance,
            currency: b.currency,
            last_movement: b.last_movement.map(Into::into),
            total_movements: b.total_movements,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardStatsDto {
    pub total: usize,
    pub active: usize,
    pub blocked: usize,
    pub lost: usize,
    pub active_percentage: f64,
}

impl From<CardStats> for CardStatsDto {
    fn from(s: CardStats) -> Self {
        Self {
            total: s.total,
            active: s.active,
            blocked: s.blocked,
            lost: s.lost,
            active_percentage: s.active_percentage,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCardRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 64, message = "code is required"))]
    pub code: String,
    /// parkia, rfid, other (default)
    pub provider: Option<String>,
    #[serde(default)]
    pub allow_negative: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetStatusRequest {
    /// active, blocked, lost
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetAllowNegativeRequest {
    pub allow_negative: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMovementRequest {
    /// Positive amount
    pub amount: Decimal,
    /// credit or debit
    pub movement_type: String,
    /// Default: now
    pub at: Option<DateTime<Utc>>,
    #[validate(length(max = 200))]
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CardListQuery {
    pub company_id: Option<Uuid>,
}
