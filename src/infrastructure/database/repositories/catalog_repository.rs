//! SeaORM implementations of the catalog repositories

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, is_unique_violation};
use crate::domain::catalog::{CatalogRepository, ModelRepository};
use crate::domain::{Brand, CatalogRecord, DomainError, DomainResult, VehicleModel, VehicleType};
use crate::infrastructure::database::entities::{brand, vehicle_model, vehicle_type};
use crate::shared::validations::name_key;

/// Map a write error, turning a name-index collision into `AlreadyExists`
fn write_err<E: CatalogRecord>(entry: &E) -> impl FnOnce(DbErr) -> DomainError + '_ {
    move |e| match e {
        e if is_unique_violation(&e) => DomainError::AlreadyExists {
            entity: E::KIND.entity_name(),
            field: "name",
            value: entry.name().to_string(),
        },
        DbErr::RecordNotUpdated => DomainError::not_found(E::KIND.entity_name(), entry.id()),
        e => db_err(e),
    }
}

// ── Brands ──────────────────────────────────────────────────────

fn brand_to_domain(m: brand::Model) -> Brand {
    Brand {
        id: m.id,
        name: m.name,
        description: m.description,
        enabled: m.enabled,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn brand_to_active(b: &Brand) -> brand::ActiveModel {
    brand::ActiveModel {
        id: Set(b.id),
        name: Set(b.name.clone()),
        name_key: Set(name_key(&b.name)),
        description: Set(b.description.clone()),
        enabled: Set(b.enabled),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}

pub struct SeaOrmBrandRepository {
    db: DatabaseConnection,
}

impl SeaOrmBrandRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository<Brand> for SeaOrmBrandRepository {
    async fn create(&self, entry: Brand) -> DomainResult<Brand> {
        let model = brand_to_active(&entry)
            .insert(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(brand_to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Brand>> {
        let model = brand::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(brand_to_domain))
    }

    async fn find_by_name(&self, _scope: Option<Uuid>, name: &str) -> DomainResult<Option<Brand>> {
        let model = brand::Entity::find()
            .filter(brand::Column::NameKey.eq(name_key(name)))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(brand_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Brand>> {
        let models = brand::Entity::find()
            .order_by_asc(brand::Column::NameKey)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(brand_to_domain).collect())
    }

    async fn update(&self, entry: Brand) -> DomainResult<Brand> {
        let model = brand_to_active(&entry)
            .update(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(brand_to_domain(model))
    }
}

// ── Vehicle types ───────────────────────────────────────────────

fn type_to_domain(m: vehicle_type::Model) -> VehicleType {
    VehicleType {
        id: m.id,
        name: m.name,
        description: m.description,
        enabled: m.enabled,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn type_to_active(t: &VehicleType) -> vehicle_type::ActiveModel {
    vehicle_type::ActiveModel {
        id: Set(t.id),
        name: Set(t.name.clone()),
        name_key: Set(name_key(&t.name)),
        description: Set(t.description.clone()),
        enabled: Set(t.enabled),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
    }
}

pub struct SeaOrmVehicleTypeRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleTypeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository<VehicleType> for SeaOrmVehicleTypeRepository {
    async fn create(&self, entry: VehicleType) -> DomainResult<VehicleType> {
        let model = type_to_active(&entry)
            .insert(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(type_to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleType>> {
        let model = vehicle_type::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(type_to_domain))
    }

    async fn find_by_name(
        &self,
        _scope: Option<Uuid>,
        name: &str,
    ) -> DomainResult<Option<VehicleType>> {
        let model = vehicle_type::Entity::find()
            .filter(vehicle_type::Column::NameKey.eq(name_key(name)))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(type_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<VehicleType>> {
        let models = vehicle_type::Entity::find()
            .order_by_asc(vehicle_type::Column::NameKey)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(type_to_domain).collect())
    }

    async fn update(&self, entry: VehicleType) -> DomainResult<VehicleType> {
        let model = type_to_active(&entry)
            .update(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(type_to_domain(model))
    }
}

// ── Models ──────────────────────────────────────────────────────

fn model_to_domain(m: vehicle_model::Model) -> VehicleModel {
    VehicleModel {
        id: m.id,
        name: m.name,
        brand_id: m.brand_id,
        type_id: m.type_id,
        year: m.year,
        enabled: m.enabled,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn model_to_active(m: &VehicleModel) -> vehicle_model::ActiveModel {
    vehicle_model::ActiveModel {
        id: Set(m.id),
        name: Set(m.name.clone()),
        name_key: Set(name_key(&m.name)),
        brand_id: Set(m.brand_id),
        type_id: Set(m.type_id),
        year: Set(m.year),
        enabled: Set(m.enabled),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

pub struct SeaOrmModelRepository {
    db: DatabaseConnection,
}

impl SeaOrmModelRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository<VehicleModel> for SeaOrmModelRepository {
    async fn create(&self, entry: VehicleModel) -> DomainResult<VehicleModel> {
        let model = model_to_active(&entry)
            .insert(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleModel>> {
        let model = vehicle_model::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    /// Without a brand scope the first model with that name is returned
    async fn find_by_name(
        &self,
        scope: Option<Uuid>,
        name: &str,
    ) -> DomainResult<Option<VehicleModel>> {
        let mut query =
            vehicle_model::Entity::find().filter(vehicle_model::Column::NameKey.eq(name_key(name)));
        if let Some(brand_id) = scope {
            query = query.filter(vehicle_model::Column::BrandId.eq(brand_id));
        }
        let model = query.one(&self.db).await.map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<VehicleModel>> {
        let models = vehicle_model::Entity::find()
            .order_by_asc(vehicle_model::Column::NameKey)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, entry: VehicleModel) -> DomainResult<VehicleModel> {
        let model = model_to_active(&entry)
            .update(&self.db)
            .await
            .map_err(write_err(&entry))?;
        Ok(model_to_domain(model))
    }
}

#[async_trait]
impl ModelRepository for SeaOrmModelRepository {
    async fn find_by_brand(&self, brand_id: Uuid) -> DomainResult<Vec<VehicleModel>> {
        let models = vehicle_model::Entity::find()
            .filter(vehicle_model::Column::BrandId.eq(brand_id))
            .order_by_asc(vehicle_model::Column::NameKey)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
