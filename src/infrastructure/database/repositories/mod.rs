//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod catalog_repository;
pub mod odometer_repository;
pub mod recharge_card_repository;
pub mod repository_provider;
pub mod vehicle_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use std::str::FromStr;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

// ── Shared conversion helpers ───────────────────────────────────

/// Any database failure the core cannot act on
pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::StoreUnavailable(format!("database error: {}", e))
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Parse a text column back into its domain type
pub(crate) fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| {
        DomainError::StoreUnavailable(format!("unreadable {} column '{}': {}", column, raw, e))
    })
}
