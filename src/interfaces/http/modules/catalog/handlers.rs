//! Catalog REST API handlers
//!
//! `{kind}` accepts `brands`, `types` or `models` (singular forms too).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{CatalogEntryDto, CreateCatalogEntryRequest, FindOrCreateRequest, RenameRequest};
use crate::domain::{CatalogEntry, CatalogKind, DomainError, DomainResult};
use crate::interfaces::http::common::{
    domain_error, ApiResponse, HandlerError, HandlerResult, ValidatedJson,
};
use crate::interfaces::http::router::AppState;

fn parse_kind(raw: &str) -> Result<CatalogKind, HandlerError> {
    raw.parse().map_err(domain_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/{kind}",
    tag = "Catalog",
    params(("kind" = String, Path, description = "brands, types or models")),
    responses(
        (status = 200, description = "Enabled entries, sorted by name", body = ApiResponse<Vec<CatalogEntryDto>>),
        (status = 422, description = "Unknown kind")
    )
)]
pub async fn list_enabled(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> HandlerResult<Vec<CatalogEntryDto>> {
    let kind = parse_kind(&kind)?;
    let entries = state.catalog.list_enabled(kind).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        entries.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}",
    tag = "Catalog",
    params(("kind" = String, Path, description = "brands, types or models")),
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CatalogEntryDto>),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Invalid data or unusable brand/type")
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateCatalogEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CatalogEntryDto>>), HandlerError> {
    let kind = parse_kind(&kind)?;
    let catalog = &state.catalog;

    let created: DomainResult<CatalogEntry> = match kind {
        CatalogKind::Brand => catalog
            .create_brand(&req.name, req.description)
            .await
            .map(Into::into),
        CatalogKind::VehicleType => {
            let description = req.description.as_deref().unwrap_or(&req.name);
            catalog
                .create_type(&req.name, description)
                .await
                .map(Into::into)
        }
        CatalogKind::Model => match req.brand_id {
            Some(brand_id) => catalog
                .create_model(&req.name, brand_id, req.type_id, req.year)
                .await
                .map(Into::into),
            None => Err(DomainError::validation("brand_id", "is required for models")),
        },
    };

    let entry = created.map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}/find-or-create",
    tag = "Catalog",
    params(("kind" = String, Path, description = "brands, types or models")),
    request_body = FindOrCreateRequest,
    responses(
        (status = 200, description = "Existing or newly created entry", body = ApiResponse<CatalogEntryDto>),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn find_or_create(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    ValidatedJson(req): ValidatedJson<FindOrCreateRequest>,
) -> HandlerResult<CatalogEntryDto> {
    let kind = parse_kind(&kind)?;
    let entry = state
        .catalog
        .find_or_create(kind, &req.name, req.brand_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/{kind}/{id}",
    tag = "Catalog",
    params(
        ("kind" = String, Path, description = "brands, types or models"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry", body = ApiResponse<CatalogEntryDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> HandlerResult<CatalogEntryDto> {
    let kind = parse_kind(&kind)?;
    let entry = state.catalog.get(kind, id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/catalog/{kind}/{id}",
    tag = "Catalog",
    params(
        ("kind" = String, Path, description = "brands, types or models"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Renamed", body = ApiResponse<CatalogEntryDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn rename_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> HandlerResult<CatalogEntryDto> {
    let kind = parse_kind(&kind)?;
    let entry = state
        .catalog
        .rename(kind, id, &req.name)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}/{id}/disable",
    tag = "Catalog",
    params(
        ("kind" = String, Path, description = "brands, types or models"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Disabled", body = ApiResponse<CatalogEntryDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn disable_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> HandlerResult<CatalogEntryDto> {
    let kind = parse_kind(&kind)?;
    let entry = state.catalog.disable(kind, id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}/{id}/enable",
    tag = "Catalog",
    params(
        ("kind" = String, Path, description = "brands, types or models"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Enabled", body = ApiResponse<CatalogEntryDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn enable_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> HandlerResult<CatalogEntryDto> {
    let kind = parse_kind(&kind)?;
    let entry = state.catalog.enable(kind, id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/brands/{brand_id}/models",
    tag = "Catalog",
    params(("brand_id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Enabled models of an enabled brand", body = ApiResponse<Vec<CatalogEntryDto>>)
    )
)]
pub async fn models_by_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> HandlerResult<Vec<CatalogEntryDto>> {
    let models = state
        .catalog
        .models_by_brand(brand_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        models.into_iter().map(Into::into).collect(),
    )))
}
