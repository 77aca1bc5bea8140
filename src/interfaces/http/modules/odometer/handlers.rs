//! Odometer REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{AddReadingRequest, OdometerStatsDto, ProjectionDto, ReadingDto, StatsQuery};
use crate::domain::{DomainError, ReadingSource};
use crate::interfaces::http::common::{
    domain_error, ApiResponse, HandlerError, HandlerResult, PageQuery, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::router::AppState;
use crate::shared::{retry_with_backoff, PaginatedResult};

#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{id}/odometer",
    tag = "Odometer",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    request_body = AddReadingRequest,
    responses(
        (status = 201, description = "Reading appended", body = ApiResponse<ReadingDto>),
        (status = 404, description = "Unknown vehicle"),
        (status = 409, description = "Value below the latest reading"),
        (status = 422, description = "Invalid value")
    )
)]
pub async fn add_reading(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddReadingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReadingDto>>), HandlerError> {
    let value = req.reading_value().map_err(domain_error)?;
    let source = match req.source {
        Some(raw) => raw.parse::<ReadingSource>().map_err(domain_error)?,
        None => ReadingSource::default(),
    };
    let at = req.at.unwrap_or_else(Utc::now);

    let ledger = &state.odometer;
    let note = &req.note;
    let reading = retry_with_backoff(
        state.retry.clone(),
        move || ledger.add_reading(vehicle_id, value, source, at, note.clone()),
        |e| matches!(e, DomainError::Conflict { .. }),
        "add_reading",
    )
    .await
    .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(reading.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}/odometer",
    tag = "Odometer",
    params(("id" = Uuid, Path, description = "Vehicle ID"), PageQuery),
    responses(
        (status = 200, description = "Readings, newest first", body = ApiResponse<PaginatedResponse<ReadingDto>>)
    )
)]
pub async fn history(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<PaginatedResponse<ReadingDto>> {
    let history = state.odometer.history(vehicle_id).await.map_err(domain_error)?;
    let page = PaginatedResult::from_ordered(history.iter().cloned(), page.params());
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}/odometer/latest",
    tag = "Odometer",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Latest reading, null when the ledger is empty", body = ApiResponse<ReadingDto>)
    )
)]
pub async fn latest(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> HandlerResult<Option<ReadingDto>> {
    let latest = state.odometer.latest(vehicle_id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(latest.map(Into::into))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}/odometer/stats",
    tag = "Odometer",
    params(("id" = Uuid, Path, description = "Vehicle ID"), StatsQuery),
    responses(
        (status = 200, description = "Distance over the trailing window", body = ApiResponse<OdometerStatsDto>),
        (status = 422, description = "period_days is zero")
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> HandlerResult<OdometerStatsDto> {
    let stats = state
        .odometer
        .compute_stats(vehicle_id, query.period_days)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{id}/odometer/rebuild",
    operation_id = "rebuild_odometer",
    tag = "Odometer",
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Projection replayed from the ledger", body = ApiResponse<ProjectionDto>)
    )
)]
pub async fn rebuild(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> HandlerResult<ProjectionDto> {
    let projection = state.odometer.rebuild(vehicle_id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(projection.into())))
}
