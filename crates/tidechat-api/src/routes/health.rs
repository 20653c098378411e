use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PingResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = PingResponse)
    ),
    tag = "health"
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "healthy".to_string(),
        message: "Tidechat agent API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check with dependency status
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health details", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    // Lightweight ledger probe.
    match state.ledger.list().await {
        Ok(_) => services.insert("ledger".to_string(), "ok".to_string()),
        Err(_) => services.insert("ledger".to_string(), "unavailable".to_string()),
    };

    let status = if services.values().all(|s| s == "ok") {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
