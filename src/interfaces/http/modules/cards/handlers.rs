//! Recharge card REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{
    AddMovementRequest, BalanceDto, CardDto, CardListQuery, CardStatsDto, CreateCardRequest,
    MovementDto, SetAllowNegativeRequest, SetStatusRequest,
};
use crate::domain::{CardProvider, CardStatus, DomainError, MovementType};
use crate::interfaces::http::common::{
    domain_error, ApiResponse, HandlerError, HandlerResult, PageQuery, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::router::AppState;
use crate::shared::{retry_with_backoff, PaginatedResult};

#[utoipa::path(
    get,
    path = "/api/v1/cards",
    tag = "Recharge Cards",
    params(CardListQuery),
    responses(
        (status = 200, description = "Cards", body = ApiResponse<Vec<CardDto>>)
    )
)]
pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<CardListQuery>,
) -> HandlerResult<Vec<CardDto>> {
    let cards = state
        .cards
        .list_cards(query.company_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        cards.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/cards",
    tag = "Recharge Cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CardDto>),
        (status = 409, description = "Code already used by the company")
    )
)]
pub async fn create_card(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CardDto>>), HandlerError> {
    let provider = match req.provider {
        Some(raw) => raw.parse::<CardProvider>().map_err(domain_error)?,
        None => CardProvider::default(),
    };
    let card = state
        .cards
        .create_card(req.company_id, &req.code, provider, req.allow_negative)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(card.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/cards/stats",
    tag = "Recharge Cards",
    params(CardListQuery),
    responses(
        (status = 200, description = "Counts by status", body = ApiResponse<CardStatsDto>)
    )
)]
pub async fn card_stats(
    State(state): State<AppState>,
    Query(query): Query<CardListQuery>,
) -> HandlerResult<CardStatsDto> {
    let stats = state
        .cards
        .card_stats(query.company_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card", body = ApiResponse<CardDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> HandlerResult<CardDto> {
    let card = state.cards.get_card(card_id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(card.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}/status",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<CardDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SetStatusRequest>,
) -> HandlerResult<CardDto> {
    let status = req.status.parse::<CardStatus>().map_err(domain_error)?;
    let card = state
        .cards
        .set_status(card_id, status)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(card.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}/allow-negative",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = SetAllowNegativeRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<CardDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_allow_negative(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SetAllowNegativeRequest>,
) -> HandlerResult<CardDto> {
    let card = state
        .cards
        .set_allow_negative(card_id, req.allow_negative)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(card.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/cards/{id}/movements",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = AddMovementRequest,
    responses(
        (status = 201, description = "Movement appended", body = ApiResponse<MovementDto>),
        (status = 402, description = "Debit would overdraw the card"),
        (status = 409, description = "Card is not active"),
        (status = 422, description = "Non-positive amount")
    )
)]
pub async fn add_movement(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddMovementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MovementDto>>), HandlerError> {
    let movement_type = req
        .movement_type
        .parse::<MovementType>()
        .map_err(domain_error)?;
    let at = req.at.unwrap_or_else(Utc::now);
    let amount = req.amount;

    let ledger = &state.cards;
    let reference = &req.reference;
    let movement = retry_with_backoff(
        state.retry.clone(),
        move || ledger.add_movement(card_id, amount, movement_type, at, reference.clone()),
        |e| matches!(e, DomainError::Conflict { .. }),
        "add_movement",
    )
    .await
    .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(movement.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}/movements",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID"), PageQuery),
    responses(
        (status = 200, description = "Movements, newest first", body = ApiResponse<PaginatedResponse<MovementDto>>)
    )
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<PaginatedResponse<MovementDto>> {
    let movements = state.cards.movements(card_id).await.map_err(domain_error)?;
    let page = PaginatedResult::from_ordered(movements, page.params());
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}/balance",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Current balance", body = ApiResponse<BalanceDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> HandlerResult<BalanceDto> {
    let balance = state.cards.get_balance(card_id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(balance.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/cards/{id}/rebuild",
    operation_id = "rebuild_balance",
    tag = "Recharge Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Balance replayed from the ledger", body = ApiResponse<BalanceDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn rebuild(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> HandlerResult<BalanceDto> {
    state.cards.rebuild(card_id).await.map_err(domain_error)?;
    let balance = state.cards.get_balance(card_id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(balance.into())))
}
