//! Health check handler

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CatalogKind;
use crate::interfaces::http::router::AppState;

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: ComponentHealth,
}

/// Component health status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Record store is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.started_at.elapsed().as_secs();

    // Probe the record store
    let probe_start = Instant::now();
    let probe = state.catalog.list_enabled(CatalogKind::Brand).await;
    let latency = probe_start.elapsed().as_millis() as u64;

    let (status, store) = match probe {
        Ok(_) => (
            StatusCode::OK,
            ComponentHealth {
                status: "up".to_string(),
                latency_ms: Some(latency),
                error: None,
            },
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ComponentHealth {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        ),
    };

    let overall = if status == StatusCode::OK { "healthy" } else { "degraded" };
    (
        status,
        Json(HealthResponse {
            status: overall.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            store,
        }),
    )
}
