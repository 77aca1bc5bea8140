use rust_decimal::Decimal;
use thiserror::Error;

/// Every way a core operation can be rejected.
///
/// Variants carry the offending field or value so callers can render the
/// failure directly. Only [`DomainError::Conflict`] and
/// [`DomainError::StoreUnavailable`] are worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Validation: {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Referential integrity: {entity} {id} {reason}")]
    ReferentialIntegrity {
        entity: &'static str,
        id: String,
        reason: &'static str,
    },

    #[error("Cross reference: {field}: {message}")]
    CrossReference {
        field: &'static str,
        message: String,
    },

    #[error("Odometer regression for vehicle {vehicle_id}: {attempted} is out of order with recorded {latest}")]
    MonotonicityViolation {
        vehicle_id: String,
        /// Recorded value the attempt conflicts with
        latest: i64,
        attempted: i64,
    },

    #[error("Card {card_id} is {status}, movements are not accepted")]
    CardNotActive { card_id: String, status: String },

    #[error("Insufficient balance on card {card_id}: balance {balance}, debit {amount}")]
    InsufficientBalance {
        card_id: String,
        balance: Decimal,
        amount: Decimal,
    },

    #[error("Concurrent write on {entity} {key}, re-read and retry")]
    Conflict { entity: &'static str, key: String },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Already exists: {entity} with {field}={value}")]
    AlreadyExists {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn cross_reference(field: &'static str, message: impl Into<String>) -> Self {
        Self::CrossReference {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: value.to_string(),
        }
    }

    /// Whether the caller may retry the same request (with backoff).
    ///
    /// A `StoreUnavailable` append may or may not have landed, so callers
    /// must re-query before resubmitting a ledger entry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::StoreUnavailable(_))
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::ReferentialIntegrity { .. } => "ReferentialIntegrityError",
            Self::CrossReference { .. } => "CrossReferenceError",
            Self::MonotonicityViolation { .. } => "MonotonicityViolation",
            Self::CardNotActive { .. } => "CardNotActiveError",
            Self::InsufficientBalance { .. } => "InsufficientBalanceError",
            Self::Conflict { .. } => "ConflictError",
            Self::StoreUnavailable(_) => "StoreUnavailableError",
            Self::NotFound { .. } => "NotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflict_and_store_errors_are_retryable() {
        let conflict = DomainError::Conflict {
            entity: "OdometerReading",
            key: "v1".into(),
        };
        assert!(conflict.is_retryable());
        assert!(DomainError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!DomainError::validation("value", "must be >= 0").is_retryable());
        assert!(!DomainError::MonotonicityViolation {
            vehicle_id: "v1".into(),
            latest: 100,
            attempted: 90,
        }
        .is_retryable());
    }

    #[test]
    fn messages_carry_offending_values() {
        let err = DomainError::InsufficientBalance {
            card_id: "c1".into(),
            balance: Decimal::from(50),
            amount: Decimal::from(80),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance on card c1: balance 50, debit 80"
        );
        assert_eq!(err.kind(), "InsufficientBalanceError");
    }
}
