//! Catalog entities: brands, vehicle types and models
//!
//! Entries are never deleted; `enabled = false` hides them from new
//! assignments while existing vehicles keep their references.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};
use crate::shared::validations::name_key;

/// Which catalog an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Brand,
    VehicleType,
    Model,
}

impl CatalogKind {
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::VehicleType => "VehicleType",
            Self::Model => "Model",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brand => write!(f, "brand"),
            Self::VehicleType => write!(f, "type"),
            Self::Model => write!(f, "model"),
        }
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_lowercase().as_str() {
            "brand" | "brands" => Ok(Self::Brand),
            "type" | "types" | "vehicle_type" | "vehicle_types" => Ok(Self::VehicleType),
            "model" | "models" => Ok(Self::Model),
            other => Err(DomainError::validation(
                "kind",
                format!("unknown catalog kind '{}'", other),
            )),
        }
    }
}

/// Vehicle manufacturer
#[derive(Debug, Clone, PartialEq)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body style / usage class (van, truck, sedan...)
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A brand's model, optionally tied to a vehicle type
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleModel {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    pub type_id: Option<Uuid>,
    pub year: Option<i32>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl VehicleType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl VehicleModel {
    pub fn new(name: impl Into<String>, brand_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand_id,
            type_id: None,
            year: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Behaviour shared by every catalog entity.
///
/// Names are unique case-insensitively inside their scope: brands and types
/// share one global scope each, models are scoped by their brand.
pub trait CatalogRecord: Clone + Send + Sync + 'static {
    const KIND: CatalogKind;

    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn rename(&mut self, name: String);
    fn touch(&mut self);

    fn name_scope(&self) -> Option<Uuid> {
        None
    }

    fn uniqueness_key(&self) -> (Option<Uuid>, String) {
        (self.name_scope(), name_key(self.name()))
    }
}

impl CatalogRecord for Brand {
    const KIND: CatalogKind = CatalogKind::Brand;

    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    fn rename(&mut self, name: String) {
        self.name = name;
    }
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CatalogRecord for VehicleType {
    const KIND: CatalogKind = CatalogKind::VehicleType;

    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    fn rename(&mut self, name: String) {
        self.name = name;
    }
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl CatalogRecord for VehicleModel {
    const KIND: CatalogKind = CatalogKind::Model;

    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    fn rename(&mut self, name: String) {
        self.name = name;
    }
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
    fn name_scope(&self) -> Option<Uuid> {
        Some(self.brand_id)
    }
}

/// Any catalog entry, for the kind-generic operations
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    Brand(Brand),
    VehicleType(VehicleType),
    Model(VehicleModel),
}

impl CatalogEntry {
    pub fn kind(&self) -> CatalogKind {
        match self {
            Self::Brand(_) => CatalogKind::Brand,
            Self::VehicleType(_) => CatalogKind::VehicleType,
            Self::Model(_) => CatalogKind::Model,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Brand(b) => b.id,
            Self::VehicleType(t) => t.id,
            Self::Model(m) => m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Brand(b) => &b.name,
            Self::VehicleType(t) => &t.name,
            Self::Model(m) => &m.name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Brand(b) => b.enabled,
            Self::VehicleType(t) => t.enabled,
            Self::Model(m) => m.enabled,
        }
    }
}

impl From<Brand> for CatalogEntry {
    fn from(b: Brand) -> Self {
        Self::Brand(b)
    }
}

impl From<VehicleType> for CatalogEntry {
    fn from(t: VehicleType) -> Self {
        Self::VehicleType(t)
    }
}

impl From<VehicleModel> for CatalogEntry {
    fn from(m: VehicleModel) -> Self {
        Self::Model(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_unique_per_brand() {
        let brand_a = Uuid::new_v4();
        let brand_b = Uuid::new_v4();
        let a = VehicleModel::new("Corolla", brand_a);
        let b = VehicleModel::new("COROLLA ", brand_b);
        assert_ne!(a.uniqueness_key(), b.uniqueness_key());
        assert_eq!(
            a.uniqueness_key(),
            VehicleModel::new("corolla", brand_a).uniqueness_key()
        );
    }

    #[test]
    fn brand_names_share_a_global_scope() {
        assert_eq!(
            Brand::new("Toyota", None).uniqueness_key(),
            (None, "toyota".to_string())
        );
    }

    #[test]
    fn catalog_kind_parses_route_segments() {
        assert_eq!("brands".parse::<CatalogKind>().unwrap(), CatalogKind::Brand);
        assert_eq!("types".parse::<CatalogKind>().unwrap(), CatalogKind::VehicleType);
        assert_eq!("Model".parse::<CatalogKind>().unwrap(), CatalogKind::Model);
        assert!("trailer".parse::<CatalogKind>().is_err());
    }
}
