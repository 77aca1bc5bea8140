//! Prepaid toll/fuel cards and their movement ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::vehicle::model::percentage;
use crate::domain::{DomainError, DomainResult};

/// Card issuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardProvider {
    Parkia,
    Rfid,
    #[default]
    Other,
}

/// Card status. Only `Active` cards accept movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardStatus {
    #[default]
    Active,
    Blocked,
    Lost,
}

/// Direction of a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    Credit,
    Debit,
}

impl CardProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parkia => "parkia",
            Self::Rfid => "rfid",
            Self::Other => "other",
        }
    }
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Lost => "lost",
        }
    }
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Signed effect of `amount` on the balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

impl std::fmt::Display for CardProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "parkia" => Ok(Self::Parkia),
            "rfid" => Ok(Self::Rfid),
            "other" => Ok(Self::Other),
            other => Err(DomainError::validation(
                "provider",
                format!("unknown card provider '{}'", other),
            )),
        }
    }
}

impl std::str::FromStr for CardStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            "lost" => Ok(Self::Lost),
            other => Err(DomainError::validation(
                "status",
                format!("unknown card status '{}'", other),
            )),
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(DomainError::validation(
                "type",
                format!("unknown movement type '{}'", other),
            )),
        }
    }
}

/// A prepaid card owned by a company
#[derive(Debug, Clone, PartialEq)]
pub struct RechargeCard {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Unique per company
    pub code: String,
    pub provider: CardProvider,
    pub status: CardStatus,
    pub allow_negative: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RechargeCard {
    pub fn new(company_id: Uuid, code: impl Into<String>, provider: CardProvider) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            code: code.into(),
            provider,
            status: CardStatus::Active,
            allow_negative: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.status != CardStatus::Active {
            return Err(DomainError::CardNotActive {
                card_id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }
}

/// One immutable entry of a card's ledger
#[derive(Debug, Clone, PartialEq)]
pub struct RechargeMovement {
    pub id: Uuid,
    pub card_id: Uuid,
    /// 1-based position in the card's ledger
    pub sequence: u64,
    /// Always positive; direction comes from `movement_type`
    pub amount: Decimal,
    pub movement_type: MovementType,
    pub at: DateTime<Utc>,
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl RechargeMovement {
    pub fn signed_amount(&self) -> Decimal {
        self.movement_type.signed(self.amount)
    }
}

/// Derived state of one card's ledger. Always rebuildable by replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceProjection {
    pub balance: Decimal,
    pub last_movement: Option<RechargeMovement>,
    pub count: u64,
}

impl BalanceProjection {
    pub fn replay<'a>(
        movements: impl IntoIterator<Item = &'a RechargeMovement>,
    ) -> DomainResult<Self> {
        let mut projection = Self::default();
        for movement in movements {
            projection.apply(movement)?;
        }
        Ok(projection)
    }

    pub fn apply(&mut self, movement: &RechargeMovement) -> DomainResult<()> {
        let balance = checked_balance(self.balance, movement.signed_amount())?;
        self.record(movement, balance);
        Ok(())
    }

    /// Advance past an appended movement whose resulting balance was already
    /// obtained from [`project`](Self::project).
    pub fn record(&mut self, movement: &RechargeMovement, balance: Decimal) {
        self.balance = balance;
        self.count += 1;
        self.last_movement = Some(movement.clone());
    }

    pub fn next_sequence(&self) -> u64 {
        self.count + 1
    }

    /// Balance after a prospective movement, enforcing the negative-balance
    /// policy of `card`.
    pub fn project(
        &self,
        card: &RechargeCard,
        amount: Decimal,
        movement_type: MovementType,
    ) -> DomainResult<Decimal> {
        let projected = checked_balance(self.balance, movement_type.signed(amount))?;
        if projected < Decimal::ZERO && !card.allow_negative {
            return Err(DomainError::InsufficientBalance {
                card_id: card.id.to_string(),
                balance: self.balance,
                amount,
            });
        }
        Ok(projected)
    }
}

fn checked_balance(balance: Decimal, delta: Decimal) -> DomainResult<Decimal> {
    balance
        .checked_add(delta)
        .ok_or_else(|| DomainError::validation("amount", "balance would overflow"))
}

/// Balance report for one card
#[derive(Debug, Clone, PartialEq)]
pub struct CardBalance {
    pub card_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub last_movement: Option<RechargeMovement>,
    pub total_movements: u64,
}

/// Counts over a card collection
#[derive(Debug, Clone, PartialEq)]
pub struct CardStats {
    pub total: usize,
    pub active: usize,
    pub blocked: usize,
    pub lost: usize,
    pub active_percentage: f64,
}

impl CardStats {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a RechargeCard>) -> Self {
        let (mut total, mut active, mut blocked, mut lost) = (0, 0, 0, 0);
        for card in cards {
            total += 1;
            match card.status {
                CardStatus::Active => active += 1,
                CardStatus::Blocked => blocked += 1,
                CardStatus::Lost => lost += 1,
            }
        }
        Self {
            total,
            active,
            blocked,
            lost,
            active_percentage: percentage(active, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(sequence: u64, amount: i64, movement_type: MovementType) -> RechargeMovement {
        let now = Utc::now();
        RechargeMovement {
            id: Uuid::new_v4(),
            card_id: Uuid::nil(),
            sequence,
            amount: Decimal::from(amount),
            movement_type,
            at: now,
            reference: None,
            recorded_at: now,
        }
    }

    #[test]
    fn replay_sums_signed_amounts() {
        let log = vec![
            movement(1, 100, MovementType::Credit),
            movement(2, 30, MovementType::Debit),
            movement(3, 20, MovementType::Debit),
        ];
        let projection = BalanceProjection::replay(&log).unwrap();
        assert_eq!(projection.balance, Decimal::from(50));
        assert_eq!(projection.count, 3);
        assert_eq!(projection.last_movement.map(|m| m.sequence), Some(3));
    }

    #[test]
    fn negative_policy_gates_projection() {
        let mut card = RechargeCard::new(Uuid::new_v4(), "C-1", CardProvider::Parkia);
        let projection = BalanceProjection::replay(&[movement(1, 50, MovementType::Credit)]).unwrap();

        let err = projection
            .project(&card, Decimal::from(80), MovementType::Debit)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientBalance { .. }));

        card.allow_negative = true;
        assert_eq!(
            projection.project(&card, Decimal::from(80), MovementType::Debit),
            Ok(Decimal::from(-30))
        );
    }

    #[test]
    fn overflowing_balance_is_a_validation_error() {
        let card = RechargeCard::new(Uuid::new_v4(), "C-3", CardProvider::Other);
        let mut projection = BalanceProjection::default();
        let first = RechargeMovement {
            amount: Decimal::MAX,
            ..movement(1, 0, MovementType::Credit)
        };
        projection.apply(&first).unwrap();

        let err = projection
            .project(&card, Decimal::MAX, MovementType::Credit)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "amount", .. }));

        let second = RechargeMovement {
            sequence: 2,
            ..first.clone()
        };
        assert!(BalanceProjection::replay(&[first, second]).is_err());
        assert_eq!(projection.balance, Decimal::MAX);
        assert_eq!(projection.count, 1);
    }

    #[test]
    fn inactive_cards_are_rejected() {
        let mut card = RechargeCard::new(Uuid::new_v4(), "C-2", CardProvider::Rfid);
        assert!(card.ensure_active().is_ok());
        card.status = CardStatus::Lost;
        assert!(matches!(
            card.ensure_active(),
            Err(DomainError::CardNotActive { .. })
        ));
    }

    #[test]
    fn card_stats_counts_statuses() {
        let company = Uuid::new_v4();
        let mut cards: Vec<RechargeCard> = (0..4)
            .map(|i| RechargeCard::new(company, format!("C-{}", i), CardProvider::Other))
            .collect();
        cards[1].status = CardStatus::Blocked;
        cards[2].status = CardStatus::Lost;
        let stats = CardStats::from_cards(&cards);
        assert_eq!((stats.total, stats.active, stats.blocked, stats.lost), (4, 2, 1, 1));
        assert!((stats.active_percentage - 50.0).abs() < f64::EPSILON);
    }
}
