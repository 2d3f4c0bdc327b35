//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use engage_service::dto::{HealthResponse, ReadinessResponse};
use tracing::warn;

use crate::state::AppState;

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check with dependency health
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let ctx = state.service_context();
    let (database, cooldown) = tokio::join!(ctx.target_repo().ping(), ctx.cooldown_store().ping());

    if let Err(e) = &database {
        warn!(error = %e, "Readiness: store unreachable");
    }
    if let Err(e) = &cooldown {
        warn!(error = %e, "Readiness: cooldown backend unreachable");
    }

    let response = ReadinessResponse::ready(database.is_ok(), cooldown.is_ok());
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
