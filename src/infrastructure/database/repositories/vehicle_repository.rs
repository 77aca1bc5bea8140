//! SeaORM implementation of VehicleRepository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, parse_column};
use crate::domain::vehicle::VehicleRepository;
use crate::domain::{DomainError, DomainResult, Vehicle, VehicleFilter};
use crate::infrastructure::database::entities::vehicle;

fn entity_to_domain(v: vehicle::Model) -> DomainResult<Vehicle> {
    Ok(Vehicle {
        id: v.id,
        company_id: v.company_id,
        plate: v.plate,
        brand_id: v.brand_id,
        model_id: v.model_id,
        type_id: v.type_id,
        vin: v.vin,
        year: v.year,
        color: v.color,
        acquisition_date: v.acquisition_date,
        cost: v
            .cost
            .as_deref()
            .map(|raw| parse_column::<Decimal>("cost", raw))
            .transpose()?,
        mileage: v.mileage,
        odometer_unit: parse_column("odometer_unit", &v.odometer_unit)?,
        status: parse_column("status", &v.status)?,
        condition: parse_column("condition", &v.condition)?,
        created_at: v.created_at,
        updated_at: v.updated_at,
    })
}

fn domain_to_active(v: &Vehicle) -> vehicle::ActiveModel {
    vehicle::ActiveModel {
        id: Set(v.id),
        company_id: Set(v.company_id),
        plate: Set(v.plate.clone()),
        brand_id: Set(v.brand_id),
        model_id: Set(v.model_id),
        type_id: Set(v.type_id),
        vin: Set(v.vin.clone()),
        year: Set(v.year),
        color: Set(v.color.clone()),
        acquisition_date: Set(v.acquisition_date),
        cost: Set(v.cost.map(|c| c.to_string())),
        mileage: Set(v.mileage),
        odometer_unit: Set(v.odometer_unit.as_str().to_string()),
        status: Set(v.status.as_str().to_string()),
        condition: Set(v.condition.as_str().to_string()),
        created_at: Set(v.created_at),
        updated_at: Set(v.updated_at),
    }
}

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn create(&self, v: Vehicle) -> DomainResult<Vehicle> {
        let model = domain_to_active(&v)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        entity_to_domain(model)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }

    async fn update(&self, v: Vehicle) -> DomainResult<Vehicle> {
        let id = v.id;
        let model = domain_to_active(&v)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Vehicle", id),
                e => db_err(e),
            })?;
        entity_to_domain(model)
    }

    async fn query(&self, filter: &VehicleFilter) -> DomainResult<Vec<Vehicle>> {
        let mut query = vehicle::Entity::find();
        if let Some(company_id) = filter.company_id {
            query = query.filter(vehicle::Column::CompanyId.eq(company_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(vehicle::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_asc(vehicle::Column::Plate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }
}
