//! Catalog DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{CatalogEntry, VehicleModel};

/// A brand, vehicle type or model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntryDto {
    pub id: Uuid,
    /// "brand", "type" or "model"
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    /// Models only
    pub brand_id: Option<Uuid>,
    /// Models only
    pub type_id: Option<Uuid>,
    /// Models only
    pub year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogEntry> for CatalogEntryDto {
    fn from(entry: CatalogEntry) -> Self {
        let kind = entry.kind().to_string();
        match entry {
            CatalogEntry::Brand(b) => Self {
                id: b.id,
                kind,
                name: b.name,
                description: b.description,
                enabled: b.enabled,
                brand_id: None,
                type_id: None,
                year: None,
                created_at: b.created_at,
                updated_at: b.updated_at,
            },
            CatalogEntry::VehicleType(t) => Self {
                id: t.id,
                kind,
                name: t.name,
                description: Some(t.description),
                enabled: t.enabled,
                brand_id: None,
                type_id: None,
                year: None,
                created_at: t.created_at,
                updated_at: t.updated_at,
            },
            CatalogEntry::Model(m) => Self {
                id: m.id,
                kind,
                name: m.name,
                description: None,
                enabled: m.enabled,
                brand_id: Some(m.brand_id),
                type_id: m.type_id,
                year: m.year,
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        }
    }
}

impl From<VehicleModel> for CatalogEntryDto {
    fn from(model: VehicleModel) -> Self {
        CatalogEntry::Model(model).into()
    }
}

/// Create a catalog entry. Which fields apply depends on the kind in the path.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCatalogEntryRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    /// Brands and types
    pub description: Option<String>,
    /// Required for models
    pub brand_id: Option<Uuid>,
    /// Models only
    pub type_id: Option<Uuid>,
    /// Models only
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FindOrCreateRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    /// Required for models
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
}
