//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Lists providers
/// 2. **Cache**: Redis PING
/// 3. **Staging**: Counts outstanding aggregation jobs
/// 4. **Event bus**: Redis PING on the publishing connection
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected, 3 providers" },
///     "cache": { "status": "ok", "message": "Redis connected" },
///     "staging": { "status": "ok", "message": "Outstanding jobs: 0" },
///     "event_bus": { "status": "ok", "message": "Broker reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let checks = HealthChecks {
        database: check_database(&state).await,
        cache: check_cache(&state).await,
        staging: check_staging(&state).await,
        event_bus: check_event_bus(&state).await,
    };
    let all_healthy = checks.all_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.provider_service.list_providers().await {
        Ok(providers) => CheckStatus::ok(format!("Connected, {} providers", providers.len())),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::ok("Redis connected")
    } else {
        CheckStatus::error("Redis connection failed")
    }
}

async fn check_staging(state: &AppState) -> CheckStatus {
    match state.staging.outstanding().await {
        Ok(n) => CheckStatus::ok(format!("Outstanding jobs: {}", n)),
        Err(e) => CheckStatus::error(format!("Staging store error: {}", e)),
    }
}

async fn check_event_bus(state: &AppState) -> CheckStatus {
    if state.event_bus.health_check().await {
        CheckStatus::ok("Broker reachable")
    } else {
        CheckStatus::error("Broker unreachable")
    }
}
