//! Response envelope, pagination and error mapping shared by every module

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::DomainError;
use crate::shared::{PaginatedResult, PaginationParams};

/// Standard API envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result
pub type HandlerError = (StatusCode, Json<ApiResponse<()>>);

pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, HandlerError>;

/// HTTP status for each domain error kind
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. }
        | DomainError::ReferentialIntegrity { .. }
        | DomainError::CrossReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists { .. }
        | DomainError::Conflict { .. }
        | DomainError::MonotonicityViolation { .. }
        | DomainError::CardNotActive { .. } => StatusCode::CONFLICT,
        DomainError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
        DomainError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Render a domain error as `(status, envelope)`
pub fn domain_error(error: DomainError) -> HandlerError {
    let status = status_for(&error);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        warn!(error = %error, "Record store unavailable");
    }
    (
        status,
        Json(ApiResponse::error(format!("{}: {}", error.kind(), error))),
    )
}

/// `?page=&limit=` query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1. Default: 1
    pub page: Option<u32>,
    /// Page size, 1..=100. Default: 20
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn params(&self) -> PaginationParams {
        PaginationParams::normalized(self.page, self.limit)
    }
}

/// One page of a list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Convert a page of domain values into DTOs
    pub fn from_result<U: Into<T>>(result: PaginatedResult<U>) -> Self {
        Self {
            items: result.items.into_iter().map(Into::into).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(
            status_for(&DomainError::validation("name", "must not be blank")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&DomainError::not_found("Vehicle", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DomainError::MonotonicityViolation {
                vehicle_id: "v".into(),
                latest: 10,
                attempted: 5,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DomainError::InsufficientBalance {
                card_id: "c".into(),
                balance: Decimal::ZERO,
                amount: Decimal::ONE,
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_for(&DomainError::StoreUnavailable("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn error_body_names_the_kind() {
        let (status, Json(body)) = domain_error(DomainError::validation("amount", "must be positive"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert!(body.error.unwrap().starts_with("ValidationError"));
    }
}
