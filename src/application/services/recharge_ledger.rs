//! Recharge card ledger
//!
//! Cards plus their append-only movement logs. The balance check and the
//! append run under the card's lock and the append carries the expected
//! sequence number, so two debits can never both pass against the same
//! balance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::KeyedLocks;
use crate::config::FleetSettings;
use crate::domain::{
    BalanceProjection, CardBalance, CardProvider, CardStats, CardStatus, DomainError,
    DomainResult, MovementType, RechargeCard, RechargeMovement, RepositoryProvider,
};
use crate::shared::validations::{optional_text, require_text};
use crate::shared::with_deadline;

pub struct RechargeCardLedger {
    repos: Arc<dyn RepositoryProvider>,
    settings: FleetSettings,
    locks: KeyedLocks,
    cache: DashMap<Uuid, BalanceProjection>,
}

impl RechargeCardLedger {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: FleetSettings) -> Self {
        Self {
            repos,
            settings,
            locks: KeyedLocks::new(),
            cache: DashMap::new(),
        }
    }

    // ── Cards ───────────────────────────────────────────────────

    /// Issue a card. Codes are unique per company.
    pub async fn create_card(
        &self,
        company_id: Uuid,
        code: &str,
        provider: CardProvider,
        allow_negative: bool,
    ) -> DomainResult<RechargeCard> {
        let code = require_text("code", code)?;
        let mut card = RechargeCard::new(company_id, code, provider);
        card.allow_negative = allow_negative;

        let created = self
            .store("recharge_cards.create", self.repos.recharge_cards().create(card))
            .await?;
        info!(
            card_id = %created.id,
            %company_id,
            code = %created.code,
            provider = %created.provider,
            "Recharge card created"
        );
        Ok(created)
    }

    pub async fn get_card(&self, card_id: Uuid) -> DomainResult<RechargeCard> {
        self.store("recharge_cards.find_by_id", self.repos.recharge_cards().find_by_id(card_id))
            .await?
            .ok_or_else(|| DomainError::not_found("RechargeCard", card_id))
    }

    pub async fn list_cards(&self, company_id: Option<Uuid>) -> DomainResult<Vec<RechargeCard>> {
        self.store(
            "recharge_cards.find_by_company",
            self.repos.recharge_cards().find_by_company(company_id),
        )
        .await
    }

    /// Block, report lost or reactivate a card
    pub async fn set_status(&self, card_id: Uuid, status: CardStatus) -> DomainResult<RechargeCard> {
        let _guard = self.locks.acquire(card_id).await;
        let mut card = self.get_card(card_id).await?;
        if card.status == status {
            return Ok(card);
        }
        let previous = card.status;
        card.status = status;
        card.updated_at = Utc::now();
        let updated = self
            .store("recharge_cards.update", self.repos.recharge_cards().update(card))
            .await?;
        info!(%card_id, from = %previous, to = %status, "Card status changed");
        Ok(updated)
    }

    pub async fn set_allow_negative(&self, card_id: Uuid, allow: bool) -> DomainResult<RechargeCard> {
        let _guard = self.locks.acquire(card_id).await;
        let mut card = self.get_card(card_id).await?;
        card.allow_negative = allow;
        card.updated_at = Utc::now();
        let updated = self
            .store("recharge_cards.update", self.repos.recharge_cards().update(card))
            .await?;
        info!(%card_id, allow_negative = allow, "Card negative-balance policy changed");
        Ok(updated)
    }

    // ── Movements ───────────────────────────────────────────────

    /// Append a credit or debit, enforcing card status and the
    /// negative-balance policy.
    pub async fn add_movement(
        &self,
        card_id: Uuid,
        amount: Decimal,
        movement_type: MovementType,
        at: DateTime<Utc>,
        reference: Option<String>,
    ) -> DomainResult<RechargeMovement> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation(
                "amount",
                format!("{} must be positive", amount),
            ));
        }

        let _guard = self.locks.acquire(card_id).await;

        let card = self.get_card(card_id).await?;
        let mut projection = self.writer_projection(card_id).await?;
        let projected = card
            .ensure_active()
            .and_then(|_| projection.project(&card, amount, movement_type))
            .inspect_err(|e| {
                warn!(%card_id, %amount, movement_type = %movement_type, error = %e, "Movement rejected")
            })?;

        let movement = RechargeMovement {
            id: Uuid::new_v4(),
            card_id,
            sequence: projection.next_sequence(),
            amount,
            movement_type,
            at,
            reference: optional_text(reference),
            recorded_at: Utc::now(),
        };

        match self
            .store("recharge_movements.append", self.repos.recharge_movements().append(movement))
            .await
        {
            Ok(stored) => {
                projection.record(&stored, projected);
                info!(
                    %card_id,
                    %amount,
                    movement_type = %movement_type,
                    balance = %projection.balance,
                    sequence = stored.sequence,
                    "Movement recorded"
                );
                self.cache.insert(card_id, projection);
                Ok(stored)
            }
            Err(e) => {
                if e.is_retryable() {
                    self.cache.remove(&card_id);
                }
                warn!(%card_id, error = %e, "Movement append failed");
                Err(e)
            }
        }
    }

    /// Current balance. The cached projection is served only while it covers
    /// every stored movement; otherwise the log is replayed.
    pub async fn get_balance(&self, card_id: Uuid) -> DomainResult<CardBalance> {
        self.get_card(card_id).await?;
        let projection = self.reader_projection(card_id).await?;
        Ok(CardBalance {
            card_id,
            balance: projection.balance,
            currency: self.settings.currency.clone(),
            last_movement: projection.last_movement,
            total_movements: projection.count,
        })
    }

    /// Movements of a card, newest first
    pub async fn movements(&self, card_id: Uuid) -> DomainResult<Vec<RechargeMovement>> {
        let mut movements = self.load(card_id).await?;
        movements.reverse();
        Ok(movements)
    }

    /// Balance recomputed from the full log, bypassing the cache
    pub async fn replay_balance(&self, card_id: Uuid) -> DomainResult<Decimal> {
        Ok(BalanceProjection::replay(&self.load(card_id).await?)?.balance)
    }

    pub async fn rebuild(&self, card_id: Uuid) -> DomainResult<BalanceProjection> {
        let _guard = self.locks.acquire(card_id).await;
        let projection = BalanceProjection::replay(&self.load(card_id).await?)?;
        self.cache.insert(card_id, projection.clone());
        debug!(%card_id, balance = %projection.balance, "Balance projection rebuilt");
        Ok(projection)
    }

    // ── Statistics ──────────────────────────────────────────────

    pub fn compute_card_stats(cards: &[RechargeCard]) -> CardStats {
        CardStats::from_cards(cards)
    }

    pub async fn card_stats(&self, company_id: Option<Uuid>) -> DomainResult<CardStats> {
        let cards = self.list_cards(company_id).await?;
        Ok(Self::compute_card_stats(&cards))
    }

    /// Caller must hold the card's lock
    async fn writer_projection(&self, card_id: Uuid) -> DomainResult<BalanceProjection> {
        if let Some(cached) = self.cache.get(&card_id) {
            return Ok(cached.clone());
        }
        let projection = BalanceProjection::replay(&self.load(card_id).await?)?;
        debug!(%card_id, count = projection.count, "Balance projection replayed");
        self.cache.insert(card_id, projection.clone());
        Ok(projection)
    }

    /// Movements appended by other writers leave the cache short of the log;
    /// such an entry is dropped so the next writer replays too.
    async fn reader_projection(&self, card_id: Uuid) -> DomainResult<BalanceProjection> {
        let cached = self.cache.get(&card_id).map(|c| c.clone());
        if let Some(cached) = cached {
            let stored = self
                .store(
                    "recharge_movements.count_by_card",
                    self.repos.recharge_movements().count_by_card(card_id),
                )
                .await?;
            if stored == cached.count {
                return Ok(cached);
            }
            debug!(%card_id, cached = cached.count, stored, "Cached balance is behind the log");
            self.cache.remove_if(&card_id, |_, p| p.count == cached.count);
        }
        BalanceProjection::replay(&self.load(card_id).await?)
    }

    async fn load(&self, card_id: Uuid) -> DomainResult<Vec<RechargeMovement>> {
        self.store(
            "recharge_movements.find_by_card",
            self.repos.recharge_movements().find_by_card(card_id),
        )
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
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn ledger() -> RechargeCardLedger {
        RechargeCardLedger::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            FleetSettings::default(),
        )
    }

    async fn card_with_balance(ledger: &RechargeCardLedger, allow_negative: bool, balance: i64) -> Uuid {
        let card = ledger
            .create_card(Uuid::new_v4(), "PK-001", CardProvider::Parkia, allow_negative)
            .await
            .unwrap();
        if balance > 0 {
            ledger
                .add_movement(card.id, Decimal::from(balance), MovementType::Credit, Utc::now(), None)
                .await
                .unwrap();
        }
        card.id
    }

    #[tokio::test]
    async fn debit_beyond_balance_is_rejected_without_negative_policy() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, false, 50).await;

        let err = ledger
            .add_movement(card, Decimal::from(80), MovementType::Debit, Utc::now(), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientBalance {
                card_id: card.to_string(),
                balance: Decimal::from(50),
                amount: Decimal::from(80),
            }
        );
        assert_eq!(ledger.get_balance(card).await.unwrap().balance, Decimal::from(50));
        assert_eq!(ledger.movements(card).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn negative_policy_allows_overdraft() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, true, 50).await;
        ledger
            .add_movement(card, Decimal::from(80), MovementType::Debit, Utc::now(), Some("toll".into()))
            .await
            .unwrap();
        let balance = ledger.get_balance(card).await.unwrap();
        assert_eq!(balance.balance, Decimal::from(-30));
        assert_eq!(balance.total_movements, 2);
        assert_eq!(balance.currency, "EUR");
        assert_eq!(balance.last_movement.unwrap().reference.as_deref(), Some("toll"));
    }

    #[tokio::test]
    async fn blocked_cards_accept_no_movements() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, true, 100).await;
        ledger.set_status(card, CardStatus::Blocked).await.unwrap();

        for (amount, kind) in [(1, MovementType::Credit), (5, MovementType::Debit)] {
            assert!(matches!(
                ledger.add_movement(card, Decimal::from(amount), kind, Utc::now(), None).await,
                Err(DomainError::CardNotActive { .. })
            ));
        }

        ledger.set_status(card, CardStatus::Active).await.unwrap();
        ledger
            .add_movement(card, Decimal::from(5), MovementType::Debit, Utc::now(), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, false, 0).await;
        for amount in [Decimal::ZERO, Decimal::from(-3)] {
            assert!(matches!(
                ledger.add_movement(card, amount, MovementType::Credit, Utc::now(), None).await,
                Err(DomainError::Validation { field: "amount", .. })
            ));
        }
    }

    #[tokio::test]
    async fn overflowing_credit_is_rejected_without_touching_the_ledger() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, false, 0).await;
        ledger
            .add_movement(card, Decimal::MAX, MovementType::Credit, Utc::now(), None)
            .await
            .unwrap();

        let err = ledger
            .add_movement(card, Decimal::MAX, MovementType::Credit, Utc::now(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "amount", .. }));

        let balance = ledger.get_balance(card).await.unwrap();
        assert_eq!(balance.balance, Decimal::MAX);
        assert_eq!(balance.total_movements, 1);
    }

    #[tokio::test]
    async fn balance_reflects_movements_from_another_ledger() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let first = RechargeCardLedger::new(repos.clone(), FleetSettings::default());
        let second = RechargeCardLedger::new(repos, FleetSettings::default());
        let card = card_with_balance(&first, false, 50).await;

        second
            .add_movement(card, Decimal::from(30), MovementType::Credit, Utc::now(), None)
            .await
            .unwrap();

        let balance = first.get_balance(card).await.unwrap();
        assert_eq!(balance.balance, Decimal::from(80));
        assert_eq!(balance.total_movements, 2);
        assert_eq!(balance.balance, first.replay_balance(card).await.unwrap());

        first
            .add_movement(card, Decimal::from(80), MovementType::Debit, Utc::now(), None)
            .await
            .unwrap();
        assert_eq!(first.get_balance(card).await.unwrap().balance, Decimal::ZERO);
        assert_eq!(second.get_balance(card).await.unwrap().balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn card_codes_are_unique_per_company() {
        let ledger = ledger();
        let company = Uuid::new_v4();
        ledger.create_card(company, "RF-1", CardProvider::Rfid, false).await.unwrap();
        assert!(matches!(
            ledger.create_card(company, "RF-1", CardProvider::Rfid, false).await,
            Err(DomainError::AlreadyExists { .. })
        ));
        ledger.create_card(Uuid::new_v4(), "RF-1", CardProvider::Rfid, false).await.unwrap();
    }

    #[tokio::test]
    async fn movements_are_listed_newest_first() {
        let ledger = ledger();
        let card = card_with_balance(&ledger, false, 10).await;
        ledger
            .add_movement(card, Decimal::from(4), MovementType::Debit, Utc::now(), None)
            .await
            .unwrap();
        let sequences: Vec<u64> = ledger.movements(card).await.unwrap().iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![2, 1]);
    }

    #[tokio::test]
    async fn card_stats_count_statuses() {
        let ledger = ledger();
        let company = Uuid::new_v4();
        let a = ledger.create_card(company, "A", CardProvider::Other, false).await.unwrap();
        ledger.create_card(company, "B", CardProvider::Other, false).await.unwrap();
        ledger.set_status(a.id, CardStatus::Lost).await.unwrap();

        let stats = ledger.card_stats(Some(company)).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.lost, 1);
        assert!((stats.active_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_debits_never_overdraw() {
        let ledger = Arc::new(ledger());
        let card = card_with_balance(&ledger, false, 100).await;

        let mut tasks = Vec::new();
        for _ in 0..25 {
            let ledger = ledger.clone();
            tasks.push(tokio::spawn(async move {
                ledger
                    .add_movement(card, Decimal::from(10), MovementType::Debit, Utc::now(), None)
                    .await
            }));
        }
        let mut accepted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, DomainError::InsufficientBalance { .. })),
            }
        }

        assert_eq!(accepted, 10);
        let balance = ledger.get_balance(card).await.unwrap().balance;
        assert_eq!(balance, Decimal::ZERO);
        assert_eq!(ledger.replay_balance(card).await.unwrap(), balance);
        assert_eq!(ledger.rebuild(card).await.unwrap().balance, balance);
    }
}
