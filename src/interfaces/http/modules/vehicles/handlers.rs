//! Vehicle REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{
    CreateVehicleRequest, FleetStatsDto, UpdateVehicleRequest, VehicleDto, VehicleListQuery,
};
use crate::interfaces::http::common::{
    domain_error, ApiResponse, HandlerError, HandlerResult, PageQuery, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::router::AppState;
use crate::shared::PaginatedResult;

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    params(VehicleListQuery, PageQuery),
    responses(
        (status = 200, description = "Vehicles sorted by plate", body = ApiResponse<PaginatedResponse<VehicleDto>>)
    )
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<PaginatedResponse<VehicleDto>> {
    let filter = query.filter().map_err(domain_error)?;
    let vehicles = state.vehicles.list(&filter).await.map_err(domain_error)?;
    let page = PaginatedResult::from_ordered(vehicles, page.params());
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(page))))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Registered", body = ApiResponse<VehicleDto>),
        (status = 422, description = "Invalid data or catalog reference")
    )
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleDto>>), HandlerError> {
    let input = req.into_new_vehicle().map_err(domain_error)?;
    let vehicle = state.vehicles.create(input).await.map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/stats",
    tag = "Vehicles",
    params(VehicleListQuery),
    responses(
        (status = 200, description = "Counts by status and condition", body = ApiResponse<FleetStatsDto>)
    )
)]
pub async fn fleet_stats(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> HandlerResult<FleetStatsDto> {
    let filter = query.filter().map_err(domain_error)?;
    let stats = state.vehicles.fleet_stats(&filter).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HandlerResult<VehicleDto> {
    let vehicle = state.vehicles.get(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid data or catalog reference")
    )
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateVehicleRequest>,
) -> HandlerResult<VehicleDto> {
    let patch = req.into_patch().map_err(domain_error)?;
    let vehicle = state.vehicles.update(id, patch).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}
