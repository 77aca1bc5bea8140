//! SeaORM implementations of RechargeCardRepository and MovementRepository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::{db_err, is_unique_violation, parse_column};
use crate::domain::recharge_card::{MovementRepository, RechargeCardRepository};
use crate::domain::{DomainError, DomainResult, RechargeCard, RechargeMovement};
use crate::infrastructure::database::entities::{recharge_card, recharge_movement};
use crate::shared::validations::name_key;

// ── Conversion helpers ──────────────────────────────────────────

fn card_to_domain(c: recharge_card::Model) -> DomainResult<RechargeCard> {
    Ok(RechargeCard {
        id: c.id,
        company_id: c.company_id,
        code: c.code,
        provider: parse_column("provider", &c.provider)?,
        status: parse_column("status", &c.status)?,
        allow_negative: c.allow_negative,
        created_at: c.created_at,
        updated_at: c.updated_at,
    })
}

fn movement_to_domain(m: recharge_movement::Model) -> DomainResult<RechargeMovement> {
    Ok(RechargeMovement {
        id: m.id,
        card_id: m.card_id,
        sequence: m.sequence as u64,
        amount: parse_column::<Decimal>("amount", &m.amount)?,
        movement_type: parse_column("movement_type", &m.movement_type)?,
        at: m.at,
        reference: m.reference,
        recorded_at: m.recorded_at,
    })
}

// ── SeaOrmRechargeCardRepository ────────────────────────────────

pub struct SeaOrmRechargeCardRepository {
    db: DatabaseConnection,
}

impl SeaOrmRechargeCardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RechargeCardRepository for SeaOrmRechargeCardRepository {
    async fn create(&self, card: RechargeCard) -> DomainResult<RechargeCard> {
        let model = recharge_card::ActiveModel {
            id: Set(card.id),
            company_id: Set(card.company_id),
            code: Set(card.code.clone()),
            code_key: Set(name_key(&card.code)),
            provider: Set(card.provider.as_str().to_string()),
            status: Set(card.status.as_str().to_string()),
            allow_negative: Set(card.allow_negative),
            created_at: Set(card.created_at),
            updated_at: Set(card.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyExists {
                    entity: "RechargeCard",
                    field: "code",
                    value: card.code.clone(),
                }
            } else {
                db_err(e)
            }
        })?;
        card_to_domain(model)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RechargeCard>> {
        let model = recharge_card::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(card_to_domain).transpose()
    }

    async fn find_by_code(&self, company_id: Uuid, code: &str) -> DomainResult<Option<RechargeCard>> {
        let model = recharge_card::Entity::find()
            .filter(recharge_card::Column::CompanyId.eq(company_id))
            .filter(recharge_card::Column::CodeKey.eq(name_key(code)))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(card_to_domain).transpose()
    }

    async fn find_by_company(&self, company_id: Option<Uuid>) -> DomainResult<Vec<RechargeCard>> {
        let mut query = recharge_card::Entity::find();
        if let Some(company_id) = company_id {
            query = query.filter(recharge_card::Column::CompanyId.eq(company_id));
        }
        let models = query
            .order_by_asc(recharge_card::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(card_to_domain).collect()
    }

    /// Codes are immutable; only the remaining fields are written
    async fn update(&self, card: RechargeCard) -> DomainResult<RechargeCard> {
        let id = card.id;
        let model = recharge_card::ActiveModel {
            id: Set(id),
            provider: Set(card.provider.as_str().to_string()),
            status: Set(card.status.as_str().to_string()),
            allow_negative: Set(card.allow_negative),
            updated_at: Set(card.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => DomainError::not_found("RechargeCard", id),
            e => db_err(e),
        })?;
        card_to_domain(model)
    }
}

// ── SeaOrmMovementRepository ────────────────────────────────────

pub struct SeaOrmMovementRepository {
    db: DatabaseConnection,
}

impl SeaOrmMovementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovementRepository for SeaOrmMovementRepository {
    async fn append(&self, movement: RechargeMovement) -> DomainResult<RechargeMovement> {
        let card_id = movement.card_id;
        let conflict = || DomainError::Conflict {
            entity: "RechargeMovement",
            key: card_id.to_string(),
        };
        let txn = self.db.begin().await.map_err(db_err)?;

        let count = recharge_movement::Entity::find()
            .filter(recharge_movement::Column::CardId.eq(card_id))
            .count(&txn)
            .await
            .map_err(db_err)?;
        if movement.sequence != count + 1 {
            debug!(%card_id, expected = movement.sequence, count, "Stale movement sequence");
            return Err(conflict());
        }

        let model = recharge_movement::ActiveModel {
            id: Set(movement.id),
            card_id: Set(card_id),
            sequence: Set(movement.sequence as i64),
            amount: Set(movement.amount.to_string()),
            movement_type: Set(movement.movement_type.as_str().to_string()),
            at: Set(movement.at),
            reference: Set(movement.reference.clone()),
            recorded_at: Set(movement.recorded_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| if is_unique_violation(&e) { conflict() } else { db_err(e) })?;

        txn.commit().await.map_err(db_err)?;
        movement_to_domain(model)
    }

    async fn find_by_card(&self, card_id: Uuid) -> DomainResult<Vec<RechargeMovement>> {
        let models = recharge_movement::Entity::find()
            .filter(recharge_movement::Column::CardId.eq(card_id))
            .order_by_asc(recharge_movement::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(movement_to_domain).collect()
    }

    async fn count_by_card(&self, card_id: Uuid) -> DomainResult<u64> {
        recharge_movement::Entity::find()
            .filter(recharge_movement::Column::CardId.eq(card_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
