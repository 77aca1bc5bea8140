//! Recharge card repository interfaces

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{RechargeCard, RechargeMovement};
use crate::domain::DomainResult;

#[async_trait]
pub trait RechargeCardRepository: Send + Sync {
    /// Persist a new card; a duplicate `(company_id, code)` is `AlreadyExists`
    async fn create(&self, card: RechargeCard) -> DomainResult<RechargeCard>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RechargeCard>>;

    async fn find_by_code(&self, company_id: Uuid, code: &str)
        -> DomainResult<Option<RechargeCard>>;

    /// Cards of a company, or every card when `company_id` is `None`
    async fn find_by_company(&self, company_id: Option<Uuid>) -> DomainResult<Vec<RechargeCard>>;

    async fn update(&self, card: RechargeCard) -> DomainResult<RechargeCard>;
}

#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// Append a movement; same sequence contract as the odometer ledger
    async fn append(&self, movement: RechargeMovement) -> DomainResult<RechargeMovement>;

    /// Full ledger of a card in append order
    async fn find_by_card(&self, card_id: Uuid) -> DomainResult<Vec<RechargeMovement>>;

    /// Number of movements in a card's ledger
    async fn count_by_card(&self, card_id: Uuid) -> DomainResult<u64>;
}
