//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PaginatedResponse};
use super::modules::{cards, catalog, health, odometer, vehicles};
use crate::application::{CatalogService, OdometerLedger, RechargeCardLedger, VehicleRegistry};
use crate::config::FleetSettings;
use crate::domain::RepositoryProvider;
use crate::shared::RetryConfig;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub vehicles: Arc<VehicleRegistry>,
    pub odometer: Arc<OdometerLedger>,
    pub cards: Arc<RechargeCardLedger>,
    /// Backoff for resubmitting ledger appends that lost a sequence check
    pub retry: RetryConfig,
    pub started_at: Arc<Instant>,
}

impl AppState {
    /// Build the four core services over one record store
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: FleetSettings) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(repos.clone(), settings.clone())),
            vehicles: Arc::new(VehicleRegistry::new(repos.clone(), settings.clone())),
            odometer: Arc::new(OdometerLedger::new(repos.clone(), settings.clone())),
            cards: Arc::new(RechargeCardLedger::new(repos, settings)),
            retry: RetryConfig::default(),
            started_at: Arc::new(Instant::now()),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Catalog
        catalog::list_enabled,
        catalog::create_entry,
        catalog::find_or_create,
        catalog::get_entry,
        catalog::rename_entry,
        catalog::disable_entry,
        catalog::enable_entry,
        catalog::models_by_brand,
        // Vehicles
        vehicles::list_vehicles,
        vehicles::create_vehicle,
        vehicles::fleet_stats,
        vehicles::get_vehicle,
        vehicles::update_vehicle,
        // Odometer
        odometer::add_reading,
        odometer::history,
        odometer::latest,
        odometer::stats,
        odometer::rebuild,
        // Recharge cards
        cards::list_cards,
        cards::create_card,
        cards::card_stats,
        cards::get_card,
        cards::set_status,
        cards::set_allow_negative,
        cards::add_movement,
        cards::list_movements,
        cards::get_balance,
        cards::rebuild,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginatedResponse<vehicles::VehicleDto>,
            PaginatedResponse<odometer::ReadingDto>,
            PaginatedResponse<cards::MovementDto>,
            health::HealthResponse,
            health::ComponentHealth,
            catalog::CatalogEntryDto,
            catalog::CreateCatalogEntryRequest,
            catalog::FindOrCreateRequest,
            catalog::RenameRequest,
            vehicles::VehicleDto,
            vehicles::CreateVehicleRequest,
            vehicles::UpdateVehicleRequest,
            vehicles::FleetStatsDto,
            odometer::ReadingDto,
            odometer::AddReadingRequest,
            odometer::OdometerStatsDto,
            odometer::ProjectionDto,
            cards::CardDto,
            cards::MovementDto,
            cards::BalanceDto,
            cards::CardStatsDto,
            cards::CreateCardRequest,
            cards::SetStatusRequest,
            cards::SetAllowNegativeRequest,
            cards::AddMovementRequest,
        )
    ),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Catalog", description = "Brands, vehicle types and models"),
        (name = "Vehicles", description = "Vehicle registry and fleet statistics"),
        (name = "Odometer", description = "Append-only odometer ledger per vehicle"),
        (name = "Recharge Cards", description = "Prepaid cards and their movement ledger"),
    ),
    info(
        title = "Fleet Ledger API",
        version = "0.1.0",
        description = "Vehicle catalog, registry, odometer and recharge card ledgers"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route(
            "/{kind}",
            get(catalog::list_enabled).post(catalog::create_entry),
        )
        .route("/{kind}/find-or-create", post(catalog::find_or_create))
        .route(
            "/{kind}/{id}",
            get(catalog::get_entry).put(catalog::rename_entry),
        )
        .route("/{kind}/{id}/disable", post(catalog::disable_entry))
        .route("/{kind}/{id}/enable", post(catalog::enable_entry));

    let brand_routes = Router::new().route("/{brand_id}/models", get(catalog::models_by_brand));

    let vehicle_routes = Router::new()
        .route(
            "/",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route("/stats", get(vehicles::fleet_stats))
        .route(
            "/{id}",
            get(vehicles::get_vehicle).patch(vehicles::update_vehicle),
        )
        .route(
            "/{id}/odometer",
            get(odometer::history).post(odometer::add_reading),
        )
        .route("/{id}/odometer/latest", get(odometer::latest))
        .route("/{id}/odometer/stats", get(odometer::stats))
        .route("/{id}/odometer/rebuild", post(odometer::rebuild));

    let card_routes = Router::new()
        .route("/", get(cards::list_cards).post(cards::create_card))
        .route("/stats", get(cards::card_stats))
        .route("/{id}", get(cards::get_card))
        .route("/{id}/status", put(cards::set_status))
        .route("/{id}/allow-negative", put(cards::set_allow_negative))
        .route(
            "/{id}/movements",
            get(cards::list_movements).post(cards::add_movement),
        )
        .route("/{id}/balance", get(cards::get_balance))
        .route("/{id}/rebuild", post(cards::rebuild));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api/v1/catalog", catalog_routes)
        .nest("/api/v1/brands", brand_routes)
        .nest("/api/v1/vehicles", vehicle_routes)
        .nest("/api/v1/cards", card_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn app() -> Router {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        create_api_router(AppState::new(repos, FleetSettings::default()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let req = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_vehicle(app: &Router) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/vehicles",
            Some(json!({"company_id": Uuid::new_v4(), "plate": " ab-123 "})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["plate"], "AB-123");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_store_up() {
        let app = app();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"]["status"], "up");
    }

    #[tokio::test]
    async fn catalog_create_and_duplicate() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/catalog/brands",
            Some(json!({"name": "Toyota"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["kind"], "brand");

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/catalog/brands",
            Some(json!({"name": "TOYOTA"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        let (status, _) = call(&app, "GET", "/api/v1/catalog/trailers", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn model_without_brand_is_rejected() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/catalog/models",
            Some(json!({"name": "Corolla"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("brand_id"));
    }

    #[tokio::test]
    async fn find_or_create_brand_then_models_by_brand() {
        let app = app();
        let (_, brand) = call(
            &app,
            "POST",
            "/api/v1/catalog/brands/find-or-create",
            Some(json!({"name": "Ford"})),
        )
        .await;
        let brand_id = brand["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/catalog/models/find-or-create",
            Some(json!({"name": "Transit", "brand_id": brand_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, models) = call(&app, "GET", &format!("/api/v1/brands/{}/models", brand_id), None).await;
        assert_eq!(models["data"].as_array().unwrap().len(), 1);
        assert_eq!(models["data"][0]["name"], "Transit");
    }

    #[tokio::test]
    async fn odometer_regression_is_409() {
        let app = app();
        let vehicle_id = register_vehicle(&app).await;
        let uri = format!("/api/v1/vehicles/{}/odometer", vehicle_id);

        let (status, _) = call(&app, "POST", &uri, Some(json!({"value": 1000}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = call(&app, "POST", &uri, Some(json!({"value": 900}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().starts_with("MonotonicityViolation"));

        let (status, _) = call(&app, "POST", &uri, Some(json!({"value": 1000.5}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, latest) = call(&app, "GET", &format!("{}/latest", uri), None).await;
        assert_eq!(latest["data"]["value"], 1000);
    }

    #[tokio::test]
    async fn unknown_vehicle_is_404() {
        let app = app();
        let uri = format!("/api/v1/vehicles/{}/odometer", Uuid::new_v4());
        let (status, _) = call(&app, "POST", &uri, Some(json!({"value": 10}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn card_balance_flow() {
        let app = app();
        let (status, card) = call(
            &app,
            "POST",
            "/api/v1/cards",
            Some(json!({"company_id": Uuid::new_v4(), "code": "C-1", "provider": "rfid"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let card_id = card["data"]["id"].as_str().unwrap().to_string();
        let movements = format!("/api/v1/cards/{}/movements", card_id);

        let (status, _) = call(
            &app,
            "POST",
            &movements,
            Some(json!({"amount": "50", "movement_type": "credit"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            &app,
            "POST",
            &movements,
            Some(json!({"amount": "80", "movement_type": "debit"})),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(body["error"].as_str().unwrap().starts_with("InsufficientBalanceError"));

        let (_, balance) = call(&app, "GET", &format!("/api/v1/cards/{}/balance", card_id), None).await;
        assert_eq!(balance["data"]["balance"], "50");
        assert_eq!(balance["data"]["currency"], "EUR");
        assert_eq!(balance["data"]["total_movements"], 1);

        let (status, _) = call(
            &app,
            "PUT",
            &format!("/api/v1/cards/{}/status", card_id),
            Some(json!({"status": "blocked"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(
            &app,
            "POST",
            &movements,
            Some(json!({"amount": "10", "movement_type": "credit"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn vehicle_list_is_paginated() {
        let app = app();
        let company = Uuid::new_v4();
        for plate in ["C-3", "A-1", "B-2"] {
            let (status, _) = call(
                &app,
                "POST",
                "/api/v1/vehicles",
                Some(json!({"company_id": company, "plate": plate})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, page) = call(
            &app,
            "GET",
            &format!("/api/v1/vehicles?company_id={}&page=2&limit=2", company),
            None,
        )
        .await;
        assert_eq!(page["data"]["total"], 3);
        assert_eq!(page["data"]["total_pages"], 2);
        assert_eq!(page["data"]["items"][0]["plate"], "C-3");

        let (_, stats) = call(&app, "GET", "/api/v1/vehicles/stats", None).await;
        assert_eq!(stats["data"]["by_status"]["active"], 3);
    }

    #[tokio::test]
    async fn invalid_body_is_rejected_before_the_core() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/cards",
            Some(json!({"company_id": Uuid::new_v4(), "code": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
